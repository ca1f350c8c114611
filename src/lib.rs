//! # contract-crawler
//!
//! Crawls a client-rendered, paginated contracts registry through Chrome DevTools Protocol (CDP),
//! opens every row's detail view and extracts the contract number and total amount.
//!
//! The registry table re-renders in place when "next" is clicked, so progress cannot be read
//! from URL changes or load events. The engine instead:
//!
//! - polls until the table exposes a visible detail link, nudging lazy rendering by scrolling
//! - compares an ordered signature of visible detail links before and after clicking "next"
//! - keeps a run-wide set of visited links so no row is fetched twice
//! - extracts fields from live element text first, falling back to a scan of the full markup
//!
//! ## Usage
//!
//! ```rust,no_run
//! use contract_crawler::{BrowserSession, CrawlConfig, Crawler, JsonLinesFile, LaunchOptions};
//!
//! # fn main() -> contract_crawler::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! let table = session.primary_view()?;
//! let config = CrawlConfig::default();
//!
//! let mut sink = JsonLinesFile::new(&config.output_path);
//! let report = Crawler::new(&session, &table, &config)?.run(&mut sink)?;
//! println!("Wrote {} contracts from {} pages", report.records_written, report.pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Chrome launch/connection and tab management
//! - [`driver`]: the automation capability the engine consumes, and its `headless_chrome` implementation
//! - [`crawl`]: the pagination-and-extraction engine
//! - [`output`]: JSON Lines persistence
//! - [`config`]: site, selectors and wait budgets
//! - [`error`]: Error types and result aliases

pub mod browser;
pub mod config;
pub mod crawl;
pub mod driver;
pub mod error;
pub mod output;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use config::{CrawlConfig, Timeouts};
pub use crawl::{Advance, ContractRecord, CrawlReport, Crawler, RowReference};
pub use driver::{ChromeView, Session, TextSearchable, View};
pub use error::{CrawlError, Result};
pub use output::{JsonLinesFile, JsonLinesSink, RecordSink};
