//! Pagination-and-extraction engine
//!
//! Components, leaves first:
//! - [`extract`]: contract number and amount from a detail view, structured read then markup scan
//! - [`detail`]: opens a row's detail view in its own tab, picks the content container, extracts
//! - [`monitor`]: waits for a freshly rendered table to expose visible row links
//! - [`rows`]: reads the visible row links once and keeps the unvisited ones
//! - [`pagination`]: clicks "next" and confirms the rows actually changed
//! - [`crawler`]: the loop tying it all together; sole owner of run-wide state
//!
//! Everything runs sequentially: the table's rendered state is shared, so no two clicks or
//! detail fetches ever overlap.

pub mod crawler;
pub mod detail;
pub mod extract;
pub mod monitor;
pub mod pagination;
pub mod poll;
pub mod rows;

pub use crawler::{CrawlReport, CrawlState, Crawler};
pub use detail::{Container, DetailFetcher, resolve_detail_url, select_container};
pub use extract::{ContractRecord, ExtractionStrategy, FieldExtractor, MarkupScan, StructuredText};
pub use monitor::{Readiness, TableMonitor};
pub use pagination::{Advance, Paginator, ViewSignature};
pub use poll::{PollOutcome, PollPolicy, poll_until};
pub use rows::{RowEnumerator, RowLinks, RowReference, VisitedSet};
