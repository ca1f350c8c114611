//! In-memory driver for exercising the engine without a browser
//!
//! Pauses advance a virtual clock instead of sleeping.

use crate::{config::CrawlConfig,
            driver::{LinkSelectors, LinkSnapshot, ScrollPosition, Session, TextPattern, TextSearchable, View},
            error::{CrawlError, Result}};
use std::{cell::{Cell, RefCell},
          collections::HashMap,
          rc::Rc,
          time::Duration};

pub fn link(href: &str, text: &str) -> LinkSnapshot {
    LinkSnapshot { href: Some(href.to_string()), text: text.to_string() }
}

fn first_match(texts: &[String], pattern: &TextPattern) -> Option<String> {
    texts.iter().find(|text| pattern.is_match(text)).cloned()
}

/// Rendered content of a page: element texts for structured reads, markup for full captures
#[derive(Debug, Clone, Default)]
pub struct FakeDocument {
    pub texts: Vec<String>,
    pub markup: String,
    pub frames: Vec<FakeFrame>,
    pub unreachable: bool,
}

impl FakeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texts<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.texts = texts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = markup.into();
        self
    }

    pub fn with_frames(mut self, frames: Vec<FakeFrame>) -> Self {
        self.frames = frames;
        self
    }

    /// Navigating to this document fails
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeFrame {
    texts: Vec<String>,
    markup: String,
    cross_origin: bool,
}

impl FakeFrame {
    pub fn new<I, S>(texts: I, markup: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { texts: texts.into_iter().map(Into::into).collect(), markup: markup.to_string(), ..Self::default() }
    }

    /// Every lookup on this frame fails
    pub fn cross_origin() -> Self {
        Self { cross_origin: true, ..Self::default() }
    }
}

impl TextSearchable for FakeFrame {
    fn find_first_text(&self, pattern: &TextPattern) -> Result<Option<String>> {
        if self.cross_origin {
            return Err(CrawlError::EvaluationFailed("Blocked a frame with origin".to_string()));
        }
        Ok(first_match(&self.texts, pattern))
    }

    fn content(&self) -> Result<String> {
        if self.cross_origin {
            return Err(CrawlError::EvaluationFailed("Blocked a frame with origin".to_string()));
        }
        Ok(self.markup.clone())
    }

    fn pause(&self, _duration: Duration) {}
}

/// Shape of the "next page" control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextControl {
    Absent,
    /// Enabled until the last page, then carries the `disabled` class
    Paged,
    Fixed { class: String, aria_disabled: Option<String> },
}

pub struct FakeView {
    document: RefCell<FakeDocument>,
    url: RefCell<String>,
    pages: Vec<Vec<LinkSnapshot>>,
    page: Cell<usize>,
    hidden_reads: Cell<usize>,
    next: NextControl,
    stuck: bool,
    intercept_clicks: bool,
    table_selector: String,
    next_selector: String,
    routes: Rc<HashMap<String, FakeDocument>>,
    navigations: Rc<RefCell<Vec<String>>>,
    link_reads: Cell<usize>,
    clicks: Cell<usize>,
    dispatched: Cell<usize>,
    scrolls: RefCell<Vec<String>>,
    paused: Cell<Duration>,
}

impl FakeView {
    pub fn new() -> Self {
        let config = CrawlConfig::default();
        Self {
            document: RefCell::new(FakeDocument::default()),
            url: RefCell::new("about:blank".to_string()),
            pages: Vec::new(),
            page: Cell::new(0),
            hidden_reads: Cell::new(0),
            next: NextControl::Paged,
            stuck: false,
            intercept_clicks: false,
            table_selector: config.table_selector,
            next_selector: config.next_selector,
            routes: Rc::default(),
            navigations: Rc::default(),
            link_reads: Cell::new(0),
            clicks: Cell::new(0),
            dispatched: Cell::new(0),
            scrolls: RefCell::new(Vec::new()),
            paused: Cell::new(Duration::ZERO),
        }
    }

    pub fn with_document(self, document: FakeDocument) -> Self {
        *self.document.borrow_mut() = document;
        self
    }

    pub fn with_texts<I, S>(self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.document.borrow_mut().texts = texts.into_iter().map(Into::into).collect();
        self
    }

    /// Table pages, each a list of visible row links in render order
    pub fn with_pages(mut self, pages: Vec<Vec<LinkSnapshot>>) -> Self {
        self.pages = pages;
        self
    }

    /// The first `reads` link reads come back empty, as while the table is still rendering
    pub fn with_hidden_reads(self, reads: usize) -> Self {
        self.hidden_reads.set(reads);
        self
    }

    pub fn with_next(mut self, next: NextControl) -> Self {
        self.next = next;
        self
    }

    /// Clicking "next" is accepted but never changes the rows
    pub fn stuck(mut self) -> Self {
        self.stuck = true;
        self
    }

    /// Real clicks are intercepted by an overlay; programmatic clicks still work
    pub fn intercept_clicks(mut self) -> Self {
        self.intercept_clicks = true;
        self
    }

    pub fn current_page(&self) -> usize {
        self.page.get()
    }

    pub fn link_reads(&self) -> usize {
        self.link_reads.get()
    }

    pub fn clicks(&self) -> usize {
        self.clicks.get()
    }

    pub fn dispatched_clicks(&self) -> usize {
        self.dispatched.get()
    }

    pub fn scrolls(&self) -> Vec<String> {
        self.scrolls.borrow().clone()
    }

    pub fn paused(&self) -> Duration {
        self.paused.get()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }

    fn turn_page(&self) {
        if !self.stuck && self.page.get() + 1 < self.pages.len() {
            self.page.set(self.page.get() + 1);
        }
    }
}

impl TextSearchable for FakeView {
    fn find_first_text(&self, pattern: &TextPattern) -> Result<Option<String>> {
        Ok(first_match(&self.document.borrow().texts, pattern))
    }

    fn content(&self) -> Result<String> {
        Ok(self.document.borrow().markup.clone())
    }

    fn pause(&self, duration: Duration) {
        self.paused.set(self.paused.get() + duration);
    }
}

impl View for FakeView {
    type Frame = FakeFrame;

    fn url(&self) -> Result<String> {
        Ok(self.url.borrow().clone())
    }

    fn navigate(&self, url: &str) -> Result<()> {
        self.navigations.borrow_mut().push(url.to_string());
        let document = self.routes.get(url).cloned().unwrap_or_default();
        if document.unreachable {
            return Err(CrawlError::NavigationFailed(format!("net::ERR_CONNECTION_RESET at {}", url)));
        }
        *self.url.borrow_mut() = url.to_string();
        *self.document.borrow_mut() = document;
        Ok(())
    }

    fn link_snapshots(&self, _selectors: &LinkSelectors) -> Result<Vec<LinkSnapshot>> {
        self.link_reads.set(self.link_reads.get() + 1);
        if self.hidden_reads.get() > 0 {
            self.hidden_reads.set(self.hidden_reads.get() - 1);
            return Ok(Vec::new());
        }
        Ok(self.pages.get(self.page.get()).cloned().unwrap_or_default())
    }

    fn exists(&self, selector: &str) -> Result<bool> {
        if selector == self.next_selector {
            return Ok(self.next != NextControl::Absent);
        }
        Ok(selector == self.table_selector && !self.pages.is_empty())
    }

    fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        if selector != self.next_selector {
            return Ok(None);
        }
        let value = match (&self.next, name) {
            (NextControl::Absent, _) => None,
            (NextControl::Paged, "class") => {
                let last = self.page.get() + 1 >= self.pages.len();
                Some(if last { "pagination-next disabled" } else { "pagination-next" }.to_string())
            }
            (NextControl::Paged, _) => None,
            (NextControl::Fixed { class, .. }, "class") => Some(class.clone()),
            (NextControl::Fixed { aria_disabled, .. }, "aria-disabled") => aria_disabled.clone(),
            (NextControl::Fixed { .. }, _) => None,
        };
        Ok(value)
    }

    fn click(&self, selector: &str) -> Result<()> {
        if selector != self.next_selector || self.next == NextControl::Absent {
            return Err(CrawlError::ElementNotFound(selector.to_string()));
        }
        self.clicks.set(self.clicks.get() + 1);
        if self.intercept_clicks {
            return Err(CrawlError::InteractionFailed {
                selector: selector.to_string(),
                reason: "Element is covered by another element".to_string(),
            });
        }
        self.turn_page();
        Ok(())
    }

    fn dispatch_click(&self, selector: &str) -> Result<()> {
        if selector != self.next_selector || self.next == NextControl::Absent {
            return Err(CrawlError::ElementNotFound(selector.to_string()));
        }
        self.dispatched.set(self.dispatched.get() + 1);
        self.turn_page();
        Ok(())
    }

    fn scroll_by(&self, dx: f64, dy: f64) -> Result<()> {
        self.scrolls.borrow_mut().push(format!("by {},{}", dx, dy));
        Ok(())
    }

    fn scroll_to(&self, position: ScrollPosition) -> Result<()> {
        let label = match position {
            ScrollPosition::Top => "top",
            ScrollPosition::Bottom => "bottom",
        };
        self.scrolls.borrow_mut().push(label.to_string());
        Ok(())
    }

    fn frames(&self) -> Result<Vec<FakeFrame>> {
        Ok(self.document.borrow().frames.clone())
    }
}

/// Hands out [`FakeView`]s that resolve navigations against fixed routes
#[derive(Default)]
pub struct FakeSession {
    routes: Rc<HashMap<String, FakeDocument>>,
    navigations: Rc<RefCell<Vec<String>>>,
    opened: Cell<usize>,
    closed: Cell<usize>,
    fail_open: bool,
    fail_close: bool,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, url: &str, document: FakeDocument) -> Self {
        Rc::make_mut(&mut self.routes).insert(url.to_string(), document);
        self
    }

    /// Every attempt to open a view fails
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Every attempt to close a view fails, after counting it
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// URLs navigated to by views of this session, in order
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }

    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    pub fn closed(&self) -> usize {
        self.closed.get()
    }
}

impl Session for FakeSession {
    type View = FakeView;

    fn open_view(&self) -> Result<FakeView> {
        if self.fail_open {
            return Err(CrawlError::TabOperationFailed("Failed to create tab: browser closed".to_string()));
        }
        self.opened.set(self.opened.get() + 1);
        let mut view = FakeView::new();
        view.routes = Rc::clone(&self.routes);
        view.navigations = Rc::clone(&self.navigations);
        Ok(view)
    }

    fn close_view(&self, _view: FakeView) -> Result<()> {
        self.closed.set(self.closed.get() + 1);
        if self.fail_close {
            return Err(CrawlError::TabOperationFailed("Failed to close tab: target already gone".to_string()));
        }
        Ok(())
    }
}
