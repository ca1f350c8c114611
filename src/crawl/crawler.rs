//! The crawl loop: settle the table, process its new rows, advance, repeat

use crate::{config::CrawlConfig,
            crawl::{detail::DetailFetcher,
                    extract::ContractRecord,
                    monitor::TableMonitor,
                    pagination::Paginator,
                    rows::{RowEnumerator, RowLinks, RowReference, VisitedSet}},
            driver::{Session, View},
            error::Result,
            output::RecordSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    LoadingInitial,
    ProcessingPage,
    AdvancingPage,
    Done,
}

/// Counters for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Table pages processed
    pub pages: usize,

    /// Calls to advance, including the final one that found no next page
    pub advances: usize,

    /// Rows handed to the detail fetcher
    pub rows_seen: usize,

    /// Records flushed to the sink
    pub records_written: usize,

    /// Rows whose detail view lacked a field
    pub misses: usize,

    /// Rows whose fetch failed outright
    pub failures: usize,
}

/// Owns the run-wide state (visited tokens and the record stash) and drives every other component
pub struct Crawler<'a, S: Session, V: View> {
    session: &'a S,
    table: &'a V,
    start_url: String,
    monitor: TableMonitor,
    enumerator: RowEnumerator,
    paginator: Paginator,
    fetcher: DetailFetcher,
    visited: VisitedSet,
    stash: Vec<ContractRecord>,
    report: CrawlReport,
}

impl<'a, S: Session, V: View> Crawler<'a, S, V> {
    /// `table` is the view the registry table is rendered in; detail views come from `session`
    pub fn new(session: &'a S, table: &'a V, config: &CrawlConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            session,
            table,
            start_url: config.start_url.clone(),
            monitor: TableMonitor::from_config(config),
            enumerator: RowEnumerator::new(RowLinks::from_config(config)),
            paginator: Paginator::from_config(config),
            fetcher: DetailFetcher::from_config(config)?,
            visited: VisitedSet::new(),
            stash: Vec::new(),
            report: CrawlReport::default(),
        })
    }

    /// Crawl every page, then flush the stash to `sink`
    pub fn run<K: RecordSink + ?Sized>(&mut self, sink: &mut K) -> Result<CrawlReport> {
        let mut state = CrawlState::LoadingInitial;

        loop {
            state = match state {
                CrawlState::LoadingInitial => {
                    log::info!("Navigating to {}", self.start_url);
                    self.table.navigate(&self.start_url)?;
                    CrawlState::ProcessingPage
                }
                CrawlState::ProcessingPage => {
                    self.report.pages += 1;
                    log::info!("Processing page {}...", self.report.pages);
                    self.process_page()?;
                    CrawlState::AdvancingPage
                }
                CrawlState::AdvancingPage => {
                    self.report.advances += 1;
                    if self.paginator.advance(self.table)?.advanced() {
                        CrawlState::ProcessingPage
                    } else {
                        log::info!("No more pages. Done.");
                        CrawlState::Done
                    }
                }
                CrawlState::Done => {
                    self.flush(sink)?;
                    return Ok(self.report.clone());
                }
            };
        }
    }

    fn process_page(&mut self) -> Result<()> {
        self.monitor.wait_until_ready(self.table);

        let rows = self.enumerator.enumerate_new_rows(self.table, &self.visited)?;
        if rows.is_empty() {
            log::info!("No new rows on this page");
            return Ok(());
        }

        log::info!("Found {} new rows", rows.len());
        for (position, row) in rows.into_iter().enumerate() {
            self.process_row(position + 1, row);
        }
        Ok(())
    }

    /// Fetch one row; whatever happens the row counts as visited afterwards
    fn process_row(&mut self, position: usize, row: RowReference) {
        log::info!("Opening row {}: {}", position, row.text);
        self.report.rows_seen += 1;

        match self.fetch(&row) {
            Ok(record) if record.is_complete() => {
                log::info!("Extracted: {:?}", record);
                self.stash.push(record);
            }
            Ok(record) => {
                log::warn!("Failed to extract fields from {} (got {:?})", row.token, record);
                self.report.misses += 1;
            }
            Err(e) => {
                log::warn!("Row {} failed: {}", row.token, e);
                self.report.failures += 1;
            }
        }

        self.visited.insert(row.token);
    }

    fn fetch(&self, row: &RowReference) -> Result<ContractRecord> {
        let table_url = self.table.url()?;
        self.fetcher.fetch_detail(self.session, &table_url, row)
    }

    fn flush<K: RecordSink + ?Sized>(&mut self, sink: &mut K) -> Result<()> {
        log::info!("Writing {} contracts", self.stash.len());
        self.report.records_written = sink.write_records(&self.stash)?;
        Ok(())
    }

    /// Tokens processed so far, in processing order
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Complete records collected so far
    pub fn stash(&self) -> &[ContractRecord] {
        &self.stash
    }
}
