//! Crawl configuration: target site, selectors and wait budgets

use crate::error::{CrawlError, Result};
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_START_URL: &str =
    "https://transparencia.e-publica.net/epublica-portal/#/palmeira/portal/compras/contratoTable";
pub const DEFAULT_DETAIL_LINK_FRAGMENT: &str = "#/palmeira/portal/compras/contratoView";
pub const DEFAULT_DETAIL_PATH_PART: &str = "/portal/compras/contratoView";
pub const DEFAULT_OUTPUT_FILE: &str = "contracts.jsonl";

/// Bounded wait budgets used across the crawl
#[derive(Debug, Clone, PartialEq)]
pub struct Timeouts {
    /// Interval between probes of every polling loop
    pub poll_interval: Duration,

    /// Budget for the table to expose a visible row link
    pub table_ready: Duration,

    /// Budget for the bare table container once `table_ready` is exhausted
    pub table_container: Duration,

    /// Budget for the row signature to change after clicking "next"
    pub advance: Duration,

    /// Pause after scrolling to the bottom before looking for "next"
    pub pre_click_settle: Duration,

    /// Vertical distance of the lazy-render scroll nudge, in pixels
    pub scroll_nudge: f64,

    /// Budget for the detail heading marker
    pub detail_marker: Duration,

    /// Budget for the contract-number text when the marker never shows
    pub detail_pattern: Duration,

    /// Budget for each structured text read
    pub structured_read: Duration,

    /// Default timeout applied to every driver call on a tab
    pub driver_default: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            table_ready: Duration::from_secs(10),
            table_container: Duration::from_secs(4),
            advance: Duration::from_secs(10),
            pre_click_settle: Duration::from_millis(100),
            scroll_nudge: 600.0,
            detail_marker: Duration::from_secs(3),
            detail_pattern: Duration::from_secs(3),
            structured_read: Duration::from_millis(2500),
            driver_default: Duration::from_secs(30),
        }
    }
}

/// Everything the crawler needs to know about the registry it walks
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Table page the crawl starts from
    pub start_url: String,

    /// Fragment every detail link `href` contains; drives the row selectors
    pub detail_link_fragment: String,

    /// Path part a token must contain to count as a detail link
    pub detail_path_part: String,

    /// Selector of the generic table container
    pub table_selector: String,

    /// Selector of the "next page" control
    pub next_selector: String,

    /// Heading text that identifies a rendered detail view
    pub detail_marker: String,

    /// Output file for extracted records
    pub output_path: PathBuf,

    pub timeouts: Timeouts,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            detail_link_fragment: DEFAULT_DETAIL_LINK_FRAGMENT.to_string(),
            detail_path_part: DEFAULT_DETAIL_PATH_PART.to_string(),
            table_selector: "table tbody".to_string(),
            next_selector: ".pagination a.pagination-next".to_string(),
            detail_marker: "Dados do contrato".to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            timeouts: Timeouts::default(),
        }
    }
}

impl CrawlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the start URL
    pub fn start_url(mut self, url: impl Into<String>) -> Self {
        self.start_url = url.into();
        self
    }

    /// Builder method: set the output path
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Builder method: replace all wait budgets
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Selector of detail links inside table rows
    pub fn row_link_selector(&self) -> String {
        format!("table tbody tr a[href*='{}']", self.detail_link_fragment)
    }

    /// Selector of detail links anywhere in the view
    pub fn any_link_selector(&self) -> String {
        format!("a[href*='{}']", self.detail_link_fragment)
    }

    /// Check the configuration before a run
    pub fn validate(&self) -> Result<()> {
        if self.start_url.trim().is_empty() {
            return Err(CrawlError::InvalidConfig("start URL is empty".to_string()));
        }
        if self.detail_path_part.is_empty() {
            return Err(CrawlError::InvalidConfig("detail path part is empty".to_string()));
        }
        if self.timeouts.poll_interval.is_zero() {
            return Err(CrawlError::InvalidConfig("poll interval must be positive".to_string()));
        }
        Ok(())
    }
}
