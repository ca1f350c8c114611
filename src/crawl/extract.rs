//! Contract number and amount extraction from a detail view
//!
//! Extraction runs an ordered list of strategies. The first one that yields both fields wins;
//! a strategy that times out hands over to the next one, any other error aborts the extraction.

use crate::{config::CrawlConfig,
            crawl::poll::wait_for_text,
            driver::{TextPattern, TextSearchable},
            error::Result};
use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::{sync::LazyLock, time::Duration};

static CONTRACT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Contrato\s+([0-9./-]{3,})").unwrap());
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Valor\s*total\s*R\$\s*([\d.,]+)").unwrap());

const CONTRACT_LABEL: &str = r"Contrato\s+[0-9./-]{3,}";
const AMOUNT_LABEL: &str = r"Valor\s*total\s*R\$";

/// The two fields pulled out of a detail view; either may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub contract: Option<String>,
    pub amount: Option<String>,
}

impl ContractRecord {
    /// Apply both field patterns to already flattened text
    pub fn parse(text: &str) -> Self {
        let text = collapse_whitespace(text);
        Self { contract: first_capture(&CONTRACT_RE, &text), amount: first_capture(&AMOUNT_RE, &text) }
    }

    /// Both fields present
    pub fn is_complete(&self) -> bool {
        self.contract.is_some() && self.amount.is_some()
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip markup down to its text nodes, skipping scripts and styles
pub fn flatten_markup(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else { continue };
        let in_code = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .is_some_and(|element| matches!(element.name(), "script" | "style" | "noscript"));
        if !in_code {
            parts.push(&**text);
        }
    }

    collapse_whitespace(&parts.join(" "))
}

/// One way of getting a [`ContractRecord`] out of a container
pub trait ExtractionStrategy {
    fn name(&self) -> &'static str;

    fn attempt(&self, container: &dyn TextSearchable) -> Result<ContractRecord>;
}

/// Reads the live element texts holding the contract number and the amount label
pub struct StructuredText {
    contract_label: TextPattern,
    amount_label: TextPattern,
    interval: Duration,
    budget: Duration,
}

impl StructuredText {
    pub fn new(interval: Duration, budget: Duration) -> Result<Self> {
        Ok(Self {
            contract_label: TextPattern::regex(CONTRACT_LABEL, true)?,
            amount_label: TextPattern::regex(AMOUNT_LABEL, true)?,
            interval,
            budget,
        })
    }
}

impl ExtractionStrategy for StructuredText {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn attempt(&self, container: &dyn TextSearchable) -> Result<ContractRecord> {
        let contract = wait_for_text(container, &self.contract_label, self.interval, self.budget)?;
        let amount = wait_for_text(container, &self.amount_label, self.interval, self.budget)?;
        Ok(ContractRecord::parse(&format!("{} {}", contract, amount)))
    }
}

/// Captures the full markup and scans its flattened text
pub struct MarkupScan;

impl ExtractionStrategy for MarkupScan {
    fn name(&self) -> &'static str {
        "markup"
    }

    fn attempt(&self, container: &dyn TextSearchable) -> Result<ContractRecord> {
        let html = container.content()?;
        Ok(ContractRecord::parse(&flatten_markup(&html)))
    }
}

pub struct FieldExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl FieldExtractor {
    /// Structured read first, markup scan as fallback
    pub fn from_config(config: &CrawlConfig) -> Result<Self> {
        let structured = StructuredText::new(config.timeouts.poll_interval, config.timeouts.structured_read)?;
        let strategies: Vec<Box<dyn ExtractionStrategy>> = vec![Box::new(structured), Box::new(MarkupScan)];
        Ok(Self::with_strategies(strategies))
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Best-effort record; missing fields are left empty for the caller to judge
    pub fn extract(&self, container: &dyn TextSearchable) -> Result<ContractRecord> {
        let mut best = ContractRecord::default();

        for strategy in &self.strategies {
            match strategy.attempt(container) {
                Ok(record) if record.is_complete() => return Ok(record),
                Ok(record) => {
                    log::debug!("{} extraction incomplete: {:?}", strategy.name(), record);
                    best = record;
                }
                Err(e) if e.is_timeout() => log::debug!("{} extraction timed out: {}", strategy.name(), e),
                Err(e) => return Err(e),
            }
        }

        Ok(best)
    }
}
