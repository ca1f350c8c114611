use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            driver::{ChromeView, Session},
            error::{CrawlError, Result}};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Default timeout applied to driver calls on every tab this session hands out
const DEFAULT_TAB_TIMEOUT: Duration = Duration::from_secs(30);

/// Browser session that manages a Chrome/Chromium instance
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// Timeout applied to new tabs
    tab_timeout: Duration,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Hide the automation flags; the registry front-end behaves differently for automated browsers
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // A crawl of a few hundred rows easily outlives the 30 second default
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| CrawlError::LaunchFailed(e.to_string()))?;

        browser.new_tab().map_err(|e| CrawlError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser, tab_timeout: DEFAULT_TAB_TIMEOUT })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let tab_timeout = Duration::from_millis(options.timeout);
        let browser = Browser::connect(options.ws_url).map_err(|e| CrawlError::ConnectionFailed(e.to_string()))?;

        Ok(Self { browser, tab_timeout })
    }

    /// Builder method: set the default timeout of tabs handed out by this session
    pub fn with_tab_timeout(mut self, timeout: Duration) -> Self {
        self.tab_timeout = timeout;
        self
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| CrawlError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// The view the table is crawled in: the first tab, created if the browser has none
    pub fn primary_view(&self) -> Result<ChromeView> {
        let tab = match self.get_tabs()?.into_iter().next() {
            Some(tab) => tab,
            None => self.create_tab()?,
        };
        tab.set_default_timeout(self.tab_timeout);
        Ok(ChromeView::new(tab))
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    fn create_tab(&self) -> Result<Arc<Tab>> {
        self.browser
            .new_tab()
            .map_err(|e| CrawlError::TabOperationFailed(format!("Failed to create tab: {}", e)))
    }

    /// Close every tab; the browser process itself goes away when the session is dropped
    pub fn close(&self) -> Result<()> {
        let tabs = self.get_tabs()?;
        for tab in tabs {
            if let Err(e) = tab.close(false) {
                log::debug!("Failed to close tab: {}", e);
            }
        }
        Ok(())
    }
}

impl Session for BrowserSession {
    type View = ChromeView;

    fn open_view(&self) -> Result<ChromeView> {
        let tab = self.create_tab()?;
        tab.set_default_timeout(self.tab_timeout);
        Ok(ChromeView::new(tab))
    }

    fn close_view(&self, view: ChromeView) -> Result<()> {
        view.tab()
            .close(false)
            .map_err(|e| CrawlError::TabOperationFailed(format!("Failed to close tab: {}", e)))?;
        Ok(())
    }
}
