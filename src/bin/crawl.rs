//! Contract crawler CLI
//!
//! Walks every page of the contracts registry table, extracts each contract's number and
//! total amount, and writes them as JSON Lines once the last page is done.

use anyhow::Context;
use clap::Parser;
use contract_crawler::{BrowserSession, ConnectionOptions, CrawlConfig, Crawler, JsonLinesFile, LaunchOptions,
                       Timeouts, config::{DEFAULT_OUTPUT_FILE, DEFAULT_START_URL}};
use std::{path::PathBuf, time::Duration};

#[derive(Parser)]
#[command(name = "contract-crawler")]
#[command(version)]
#[command(about = "Crawl a paginated contracts registry and extract contract numbers and amounts", long_about = None)]
struct Cli {
    /// Table page to start from
    #[arg(long, value_name = "URL", default_value = DEFAULT_START_URL)]
    start_url: String,

    /// JSON Lines output file
    #[arg(long, short = 'o', value_name = "PATH", default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// WebSocket endpoint URL of an already running browser
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Interval between polls of the table, in milliseconds
    #[arg(long, default_value = "200")]
    poll_interval_ms: u64,

    /// Budget for a table page to show its rows, in milliseconds
    #[arg(long, default_value = "10000")]
    table_timeout_ms: u64,

    /// Budget for the rows to change after clicking next, in milliseconds
    #[arg(long, default_value = "10000")]
    advance_timeout_ms: u64,
}

impl Cli {
    fn crawl_config(&self) -> CrawlConfig {
        let timeouts = Timeouts {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            table_ready: Duration::from_millis(self.table_timeout_ms),
            advance: Duration::from_millis(self.advance_timeout_ms),
            ..Timeouts::default()
        };

        CrawlConfig::new().start_url(&self.start_url).output_path(&self.output).timeouts(timeouts)
    }

    fn session(&self) -> contract_crawler::Result<BrowserSession> {
        if let Some(ref endpoint) = self.ws_endpoint {
            log::info!("Connecting to browser at {}", endpoint);
            return BrowserSession::connect(ConnectionOptions::new(endpoint));
        }

        let mut options = LaunchOptions::new().headless(!self.headed);
        if let Some(ref path) = self.executable_path {
            options = options.chrome_path(path);
        }
        if let Some(ref dir) = self.user_data_dir {
            options = options.user_data_dir(dir);
        }

        log::info!("Launching browser ({})", if self.headed { "headed" } else { "headless" });
        BrowserSession::launch(options)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.crawl_config();
    config.validate().context("Invalid crawl configuration")?;

    let session = cli.session().context("Failed to start browser session")?;
    let session = session.with_tab_timeout(config.timeouts.driver_default);
    let table = session.primary_view().context("Failed to open the table view")?;

    log::info!("Starting crawler for: {}", config.start_url);
    let mut sink = JsonLinesFile::new(&config.output_path);
    let report = Crawler::new(&session, &table, &config)?.run(&mut sink).context("Crawl aborted")?;

    log::info!(
        "Wrote {} contracts to {} ({} pages, {} rows, {} incomplete, {} failed)",
        report.records_written,
        sink.path().display(),
        report.pages,
        report.rows_seen,
        report.misses,
        report.failures
    );

    if let Err(e) = session.close() {
        log::debug!("Failed to close browser tabs: {}", e);
    }

    Ok(())
}
