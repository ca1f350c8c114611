//! Waiting for a freshly rendered table to become actionable

use crate::{config::CrawlConfig,
            crawl::{poll::{PollPolicy, poll_until},
                    rows::RowLinks},
            driver::View};
use std::time::Duration;

/// What the table looked like when the wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// At least one visible detail link
    RowsVisible,
    /// No rows appeared but the table container exists
    ContainerOnly,
    /// Neither rows nor the container showed up
    Empty,
}

/// Polls the table until a visible row link shows up, nudging lazy rendering between probes
#[derive(Debug, Clone)]
pub struct TableMonitor {
    links: RowLinks,
    table_selector: String,
    interval: Duration,
    ready_budget: Duration,
    container_budget: Duration,
    scroll_nudge: f64,
}

impl TableMonitor {
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            links: RowLinks::from_config(config),
            table_selector: config.table_selector.clone(),
            interval: config.timeouts.poll_interval,
            ready_budget: config.timeouts.table_ready,
            container_budget: config.timeouts.table_container,
            scroll_nudge: config.timeouts.scroll_nudge,
        }
    }

    /// Wait for the table to settle. Never fails: an empty table is reported, not raised.
    pub fn wait_until_ready<V: View + ?Sized>(&self, view: &V) -> Readiness {
        let rows = poll_until(
            &PollPolicy::new(self.interval, self.ready_budget),
            || {
                match self.links.read(view) {
                    Ok(links) if !links.is_empty() => return Ok(Some(())),
                    Ok(_) => {}
                    Err(e) => log::debug!("Row probe failed: {}", e),
                }
                if let Err(e) = view.scroll_by(0.0, self.scroll_nudge) {
                    log::debug!("Scroll nudge failed: {}", e);
                }
                Ok(None)
            },
            |d| view.pause(d),
        );
        if matches!(rows, Ok(outcome) if outcome.is_matched()) {
            return Readiness::RowsVisible;
        }

        log::debug!("No visible rows after {:?}; waiting for '{}'", self.ready_budget, self.table_selector);
        let container = poll_until(
            &PollPolicy::new(self.interval, self.container_budget),
            || Ok(view.exists(&self.table_selector).unwrap_or(false).then_some(())),
            |d| view.pause(d),
        );
        match container {
            Ok(outcome) if outcome.is_matched() => Readiness::ContainerOnly,
            _ => {
                log::debug!("Table container '{}' never appeared", self.table_selector);
                Readiness::Empty
            }
        }
    }
}
