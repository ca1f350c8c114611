//! Browser automation capability used by the crawl engine
//!
//! The engine never talks to Chrome directly. It works against three traits:
//! - [`TextSearchable`]: anything with rendered text and markup (a page or an embedded frame)
//! - [`View`]: a navigable page that can be queried, clicked and scrolled
//! - [`Session`]: a factory for isolated views (one per detail fetch)
//!
//! [`chrome`] implements them on top of `headless_chrome`.

pub mod chrome;

#[cfg(test)]
pub(crate) mod fake;

pub use chrome::{ChromeFrame, ChromeView};

use crate::error::{CrawlError, Result};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::time::Duration;

/// A regular expression searched against rendered element text
///
/// The same source is compiled locally and shipped to the page's JavaScript engine,
/// so it must stay within the syntax both understand.
#[derive(Debug, Clone)]
pub struct TextPattern {
    source: String,
    ignore_case: bool,
    regex: Regex,
}

impl TextPattern {
    /// Pattern from a regular expression source
    pub fn regex(source: &str, ignore_case: bool) -> Result<Self> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|e| CrawlError::InvalidConfig(format!("Bad text pattern '{}': {}", source, e)))?;
        Ok(Self { source: source.to_string(), ignore_case, regex })
    }

    /// Case-insensitive substring match of `text`
    pub fn literal(text: &str) -> Result<Self> {
        Self::regex(&regex::escape(text), true)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Flags for a JavaScript `RegExp`
    pub fn js_flags(&self) -> &'static str {
        if self.ignore_case { "i" } else { "" }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// One detail link as seen in a single batched read of the table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkSnapshot {
    /// Raw `href` attribute (may be empty)
    #[serde(default)]
    pub href: Option<String>,

    /// Rendered text of the enclosing row, whitespace collapsed
    #[serde(default)]
    pub text: String,
}

/// Selectors of actionable row links, table-scoped first
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSelectors {
    pub in_table: String,
    pub anywhere: String,
}

/// Absolute scroll targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPosition {
    Top,
    Bottom,
}

/// A rendering surface whose text can be searched
pub trait TextSearchable {
    /// Rendered text of the first element matching `pattern`, if one is present right now
    fn find_first_text(&self, pattern: &TextPattern) -> Result<Option<String>>;

    /// Full rendered markup
    fn content(&self) -> Result<String>;

    /// Block for `duration`; fakes override this with a virtual clock
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A navigable page
pub trait View: TextSearchable {
    type Frame: TextSearchable;

    /// Current URL, including the fragment
    fn url(&self) -> Result<String>;

    /// Navigate and wait for the document to load
    fn navigate(&self, url: &str) -> Result<()>;

    /// Visible links matching either selector, in one round-trip, table-scoped links first
    fn link_snapshots(&self, selectors: &LinkSelectors) -> Result<Vec<LinkSnapshot>>;

    /// Whether any element matches `selector`
    fn exists(&self, selector: &str) -> Result<bool>;

    /// Attribute of the first element matching `selector`
    fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>>;

    /// Real (input-event) click on the first element matching `selector`
    fn click(&self, selector: &str) -> Result<()>;

    /// Programmatic `element.click()` on the first element matching `selector`
    fn dispatch_click(&self, selector: &str) -> Result<()>;

    fn scroll_by(&self, dx: f64, dy: f64) -> Result<()>;

    fn scroll_to(&self, position: ScrollPosition) -> Result<()>;

    /// Embedded frames, excluding the page's own main frame
    fn frames(&self) -> Result<Vec<Self::Frame>>;
}

/// Source of isolated views sharing the browser session
pub trait Session {
    type View: View;

    fn open_view(&self) -> Result<Self::View>;

    fn close_view(&self, view: Self::View) -> Result<()>;
}
