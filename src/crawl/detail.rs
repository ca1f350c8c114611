//! Opening a row's detail view in its own tab and extracting from it

use crate::{config::CrawlConfig,
            crawl::{extract::{ContractRecord, FieldExtractor},
                    poll::wait_for_text,
                    rows::RowReference},
            driver::{Session, TextPattern, TextSearchable, View},
            error::Result};
use std::time::Duration;

/// Resolve a detail token against the URL of the table view
///
/// Fragment-only tokens (`#/...`) replace the fragment of `current`; anything else is used as-is.
pub fn resolve_detail_url(current: &str, token: &str) -> String {
    if token.starts_with('#') {
        let base = current.split('#').next().unwrap_or(current);
        format!("{}{}", base, token)
    } else {
        token.to_string()
    }
}

/// Where the detail content was found
pub enum Container<'a, V: View> {
    Primary(&'a V),
    Frame(usize, V::Frame),
}

impl<V: View> Container<'_, V> {
    pub fn describe(&self) -> String {
        match self {
            Self::Primary(_) => "main view".to_string(),
            Self::Frame(index, _) => format!("frame {}", index),
        }
    }
}

impl<V: View> TextSearchable for Container<'_, V> {
    fn find_first_text(&self, pattern: &TextPattern) -> Result<Option<String>> {
        match self {
            Self::Primary(view) => view.find_first_text(pattern),
            Self::Frame(_, frame) => frame.find_first_text(pattern),
        }
    }

    fn content(&self) -> Result<String> {
        match self {
            Self::Primary(view) => view.content(),
            Self::Frame(_, frame) => frame.content(),
        }
    }

    fn pause(&self, duration: Duration) {
        match self {
            Self::Primary(view) => view.pause(duration),
            Self::Frame(_, frame) => frame.pause(duration),
        }
    }
}

/// Pick the surface that renders `marker`: the main view, else the first embedded frame that does
pub fn select_container<'a, V: View>(view: &'a V, marker: &TextPattern) -> Container<'a, V> {
    match view.find_first_text(marker) {
        Ok(Some(_)) => return Container::Primary(view),
        Ok(None) => {}
        Err(e) => log::debug!("Marker lookup on main view failed: {}", e),
    }

    let frames = match view.frames() {
        Ok(frames) => frames,
        Err(e) => {
            log::debug!("Listing frames failed: {}", e);
            return Container::Primary(view);
        }
    };

    for (index, frame) in frames.into_iter().enumerate() {
        match frame.find_first_text(marker) {
            Ok(Some(_)) => return Container::Frame(index, frame),
            Ok(None) => {}
            Err(e) => log::debug!("Skipping frame {}: {}", index, e),
        }
    }

    Container::Primary(view)
}

pub struct DetailFetcher {
    marker: TextPattern,
    contract_text: TextPattern,
    interval: Duration,
    marker_budget: Duration,
    pattern_budget: Duration,
    extractor: FieldExtractor,
}

impl DetailFetcher {
    pub fn from_config(config: &CrawlConfig) -> Result<Self> {
        Ok(Self {
            marker: TextPattern::literal(&config.detail_marker)?,
            contract_text: TextPattern::regex(r"Contrato\s+[0-9./-]{3,}", false)?,
            interval: config.timeouts.poll_interval,
            marker_budget: config.timeouts.detail_marker,
            pattern_budget: config.timeouts.detail_pattern,
            extractor: FieldExtractor::from_config(config)?,
        })
    }

    /// Fetch one row's record in a fresh view, closed again on every path
    pub fn fetch_detail<S: Session>(&self, session: &S, table_url: &str, row: &RowReference) -> Result<ContractRecord> {
        let url = resolve_detail_url(table_url, &row.token);
        let view = session.open_view()?;

        let record = self.load_and_extract(&view, &url);
        let closed = session.close_view(view);

        match (record, closed) {
            (Ok(record), closed) => closed.map(|_| record),
            (Err(e), Err(close_error)) => {
                log::debug!("Failed to close detail view for {}: {}", row.token, close_error);
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
        }
    }

    fn load_and_extract<V: View>(&self, view: &V, url: &str) -> Result<ContractRecord> {
        view.navigate(url)?;
        self.wait_for_detail(view)?;

        let container = select_container(view, &self.marker);
        log::debug!("Extracting {} from {}", url, container.describe());
        self.extractor.extract(&container)
    }

    /// Wait for the heading marker, then for the contract number itself; proceed regardless
    fn wait_for_detail<V: View>(&self, view: &V) -> Result<()> {
        let waits = [(&self.marker, self.marker_budget), (&self.contract_text, self.pattern_budget)];

        for (pattern, budget) in waits {
            match wait_for_text(view, pattern, self.interval, budget) {
                Ok(_) => return Ok(()),
                Err(e) if e.is_timeout() => log::debug!("{}", e),
                Err(e) => return Err(e),
            }
        }

        log::debug!("Detail view never showed a known marker; extracting anyway");
        Ok(())
    }
}
