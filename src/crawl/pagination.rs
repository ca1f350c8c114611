//! Advancing the table and proving that it actually moved
//!
//! The table re-renders in place, so there is no navigation event to wait on. Instead the
//! ordered list of visible detail tokens is captured before clicking "next" and polled
//! afterwards until it changes.

use crate::{config::CrawlConfig,
            crawl::{monitor::TableMonitor,
                    poll::{PollPolicy, poll_until},
                    rows::RowLinks},
            driver::{ScrollPosition, View},
            error::Result};
use std::{fmt, time::Duration};

const SIGNATURE_DELIMITER: &str = "|";

/// Ordered, joined detail tokens of the current view; a change detector only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSignature(String);

impl ViewSignature {
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        Self(tokens.into_iter().collect::<Vec<_>>().join(SIGNATURE_DELIMITER))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Why `advance` did or did not move to a new page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Advanced,
    /// No "next" control in the view
    NoControl,
    /// The control is marked disabled
    Disabled,
    /// Clicked, but the rows never changed within the budget
    Unchanged,
}

impl Advance {
    pub fn advanced(self) -> bool {
        self == Self::Advanced
    }
}

impl fmt::Display for Advance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Advanced => "advanced to the next page",
            Self::NoControl => "next button not found",
            Self::Disabled => "next button disabled",
            Self::Unchanged => "rows did not change after clicking next",
        };
        f.write_str(reason)
    }
}

/// Whether a control's `class` or `aria-disabled` marks it disabled
pub fn is_disabled(class: &str, aria_disabled: &str) -> bool {
    let class_disabled = class.split_whitespace().any(|token| token.eq_ignore_ascii_case("disabled"));
    let aria = aria_disabled.trim();
    class_disabled || aria.eq_ignore_ascii_case("true") || aria.eq_ignore_ascii_case("disabled")
}

pub struct Paginator {
    links: RowLinks,
    next_selector: String,
    interval: Duration,
    budget: Duration,
    settle: Duration,
    monitor: TableMonitor,
}

impl Paginator {
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            links: RowLinks::from_config(config),
            next_selector: config.next_selector.clone(),
            interval: config.timeouts.poll_interval,
            budget: config.timeouts.advance,
            settle: config.timeouts.pre_click_settle,
            monitor: TableMonitor::from_config(config),
        }
    }

    pub fn signature<V: View + ?Sized>(&self, view: &V) -> Result<ViewSignature> {
        let snapshots = self.links.read(view)?;
        Ok(ViewSignature::from_tokens(self.links.tokens(&snapshots)))
    }

    /// Click "next" and wait for the rows to change; on success the table is settled again
    pub fn advance<V: View + ?Sized>(&self, view: &V) -> Result<Advance> {
        let outcome = self.try_advance(view)?;
        log::info!("Pagination: {}", outcome);
        Ok(outcome)
    }

    fn try_advance<V: View + ?Sized>(&self, view: &V) -> Result<Advance> {
        let before = self.signature(view)?;

        // Some pagers only render once scrolled into view
        match view.scroll_to(ScrollPosition::Bottom) {
            Ok(()) => view.pause(self.settle),
            Err(e) => log::debug!("Scroll to bottom failed: {}", e),
        }

        if !view.exists(&self.next_selector)? {
            return Ok(Advance::NoControl);
        }

        let class = view.attribute(&self.next_selector, "class")?.unwrap_or_default();
        let aria_disabled = view.attribute(&self.next_selector, "aria-disabled")?.unwrap_or_default();
        if is_disabled(&class, &aria_disabled) {
            return Ok(Advance::Disabled);
        }

        self.click_next(view)?;
        log::info!("Clicked next");

        let changed = poll_until(
            &PollPolicy::new(self.interval, self.budget),
            || {
                let after = self.signature(view)?;
                Ok((!after.is_empty() && after != before).then_some(after))
            },
            |d| view.pause(d),
        )?;
        let Some(after) = changed.matched() else {
            return Ok(Advance::Unchanged);
        };
        log::debug!("Signature changed: '{}' -> '{}'", before.as_str(), after.as_str());

        view.scroll_to(ScrollPosition::Top)?;
        self.monitor.wait_until_ready(view);
        Ok(Advance::Advanced)
    }

    fn click_next<V: View + ?Sized>(&self, view: &V) -> Result<()> {
        if let Err(e) = view.click(&self.next_selector) {
            log::debug!("Direct click on next failed ({}), dispatching a programmatic click", e);
            view.dispatch_click(&self.next_selector)?;
        }
        Ok(())
    }
}
