use crate::{driver::{LinkSelectors, LinkSnapshot, ScrollPosition, TextPattern, TextSearchable, View},
            error::{CrawlError, Result}};
use headless_chrome::Tab;
use serde_json::{Value, json};
use std::sync::Arc;

const COLLECT_LINKS_JS: &str = include_str!("collect_links.js");
const FIND_TEXT_JS: &str = include_str!("find_text.js");
const FRAME_WINDOWS_JS: &str = include_str!("frames.js");

const EXISTS_JS: &str = "(function (selector) { return document.querySelector(selector) !== null; })";

const ATTRIBUTE_JS: &str = r#"
    (function (selector, name) {
        const el = document.querySelector(selector);
        return el ? el.getAttribute(name) : null;
    })
"#;

const DISPATCH_CLICK_JS: &str = r#"
    (function (selector) {
        const el = document.querySelector(selector);
        if (!el) {
            return false;
        }
        el.click();
        return true;
    })
"#;

const FRAME_CONTENT_JS: &str = r#"
    (function (index) {
        try {
            return frameWindows(window)[index].document.documentElement.outerHTML;
        } catch (e) {
            return null;
        }
    })
"#;

const FRAME_COUNT_JS: &str = "(function () { return frameWindows(window).length; })";

/// Runs with `this` bound to the click target; true when nothing covers its midpoint
const HIT_TEST_JS: &str = r#"
    function (x, y) {
        const hit = document.elementFromPoint(x, y);
        return hit !== null && (this === hit || this.contains(hit));
    }
"#;

/// Build `(<function>)(arg1, arg2, ...)` with JSON-encoded arguments
fn invocation(function: &str, args: &[Value]) -> String {
    let args: Vec<String> = args.iter().map(Value::to_string).collect();
    format!("({})({})", function.trim(), args.join(", "))
}

/// Evaluate an expression and return its value, `None` for null/undefined
fn evaluate(tab: &Tab, expression: &str) -> Result<Option<Value>> {
    let result = tab.evaluate(expression, false).map_err(|e| CrawlError::EvaluationFailed(e.to_string()))?;
    Ok(result.value.filter(|value| !value.is_null()))
}

/// Wrap `expression` so it can call `frameWindows`
fn frame_scoped(expression: &str) -> String {
    format!("(() => {{\n{}\nreturn {};\n}})()", FRAME_WINDOWS_JS.trim(), expression)
}

fn value_to_text(value: Option<Value>) -> Option<String> {
    match value {
        None => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    }
}

fn find_text_in(tab: &Tab, pattern: &TextPattern, frame: Option<usize>) -> Result<Option<String>> {
    let frame = frame.map_or(Value::Null, |index| json!(index));
    let expression = invocation(FIND_TEXT_JS, &[json!(pattern.source()), json!(pattern.js_flags()), frame]);
    Ok(value_to_text(evaluate(tab, &frame_scoped(&expression))?))
}

/// A Chrome tab seen as a [`View`]
#[derive(Clone)]
pub struct ChromeView {
    tab: Arc<Tab>,
}

impl ChromeView {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }

    /// Get the underlying tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }
}

impl TextSearchable for ChromeView {
    fn find_first_text(&self, pattern: &TextPattern) -> Result<Option<String>> {
        find_text_in(&self.tab, pattern, None)
    }

    fn content(&self) -> Result<String> {
        self.tab
            .get_content()
            .map_err(|e| CrawlError::EvaluationFailed(format!("Failed to read page content: {}", e)))
    }
}

impl View for ChromeView {
    type Frame = ChromeFrame;

    fn url(&self) -> Result<String> {
        Ok(self.tab.get_url())
    }

    fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| CrawlError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| CrawlError::NavigationFailed(format!("Navigation to {} did not complete: {}", url, e)))?;

        Ok(())
    }

    fn link_snapshots(&self, selectors: &LinkSelectors) -> Result<Vec<LinkSnapshot>> {
        let expression = invocation(COLLECT_LINKS_JS, &[json!(selectors.in_table), json!(selectors.anywhere)]);

        // The script returns a JSON string to avoid a second round-trip for object properties
        match evaluate(&self.tab, &expression)? {
            Some(Value::String(json_str)) => Ok(serde_json::from_str(&json_str)?),
            Some(other) => Err(CrawlError::EvaluationFailed(format!("Unexpected link snapshot value: {}", other))),
            None => Ok(Vec::new()),
        }
    }

    fn exists(&self, selector: &str) -> Result<bool> {
        let value = evaluate(&self.tab, &invocation(EXISTS_JS, &[json!(selector)]))?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let value = evaluate(&self.tab, &invocation(ATTRIBUTE_JS, &[json!(selector), json!(name)]))?;
        Ok(value_to_text(value))
    }

    fn click(&self, selector: &str) -> Result<()> {
        let failed = |reason: String| CrawlError::InteractionFailed { selector: selector.to_string(), reason };

        let element = self
            .tab
            .find_element(selector)
            .map_err(|e| CrawlError::ElementNotFound(format!("Element '{}' not found: {}", selector, e)))?;

        element.scroll_into_view().map_err(|e| failed(e.to_string()))?;
        let midpoint = element.get_midpoint().map_err(|e| failed(e.to_string()))?;

        // Raw mouse events land on whatever is on top, so check the target is actually hit
        let hit = element
            .call_js_fn(HIT_TEST_JS.trim(), vec![json!(midpoint.x), json!(midpoint.y)], false)
            .map_err(|e| failed(e.to_string()))?;
        if !hit.value.and_then(|v| v.as_bool()).unwrap_or(false) {
            return Err(failed(format!("Click at ({}, {}) is intercepted by another element", midpoint.x, midpoint.y)));
        }

        self.tab.click_point(midpoint).map_err(|e| failed(e.to_string()))?;
        Ok(())
    }

    fn dispatch_click(&self, selector: &str) -> Result<()> {
        let clicked = evaluate(&self.tab, &invocation(DISPATCH_CLICK_JS, &[json!(selector)]))?;
        if clicked.and_then(|v| v.as_bool()).unwrap_or(false) {
            Ok(())
        } else {
            Err(CrawlError::ElementNotFound(format!("Element '{}' not found", selector)))
        }
    }

    fn scroll_by(&self, dx: f64, dy: f64) -> Result<()> {
        evaluate(&self.tab, &format!("window.scrollBy({}, {})", dx, dy))?;
        Ok(())
    }

    fn scroll_to(&self, position: ScrollPosition) -> Result<()> {
        let expression = match position {
            ScrollPosition::Top => "window.scrollTo(0, 0)",
            ScrollPosition::Bottom => "window.scrollTo(0, document.body.scrollHeight)",
        };
        evaluate(&self.tab, expression)?;
        Ok(())
    }

    fn frames(&self) -> Result<Vec<ChromeFrame>> {
        let expression = frame_scoped(&invocation(FRAME_COUNT_JS, &[]));
        let count = evaluate(&self.tab, &expression)?.and_then(|v| v.as_u64()).unwrap_or(0);

        Ok((0..count as usize).map(|index| ChromeFrame { tab: Arc::clone(&self.tab), index }).collect())
    }
}

/// An embedded frame of a tab at any depth, addressed by its depth-first position
#[derive(Clone)]
pub struct ChromeFrame {
    tab: Arc<Tab>,
    index: usize,
}

impl ChromeFrame {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl TextSearchable for ChromeFrame {
    fn find_first_text(&self, pattern: &TextPattern) -> Result<Option<String>> {
        find_text_in(&self.tab, pattern, Some(self.index))
    }

    fn content(&self) -> Result<String> {
        let value = evaluate(&self.tab, &frame_scoped(&invocation(FRAME_CONTENT_JS, &[json!(self.index)])))?;
        value_to_text(value)
            .ok_or_else(|| CrawlError::EvaluationFailed(format!("Frame {} content is not accessible", self.index)))
    }
}
