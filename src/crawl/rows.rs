//! Actionable rows: reading detail links off the table and picking the unvisited ones

use crate::{config::CrawlConfig,
            driver::{LinkSelectors, LinkSnapshot, View},
            error::Result};
use indexmap::IndexSet;
use std::collections::HashSet;

/// Tokens of rows already handed to the detail fetcher, in processing order
pub type VisitedSet = IndexSet<String>;

/// A row's detail-link target plus the row text seen when it was enumerated
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowReference {
    /// Raw `href` of the detail link; the dedup key within a run
    pub token: String,

    /// Rendered row text, for logging only
    pub text: String,
}

impl RowReference {
    pub fn new(token: impl Into<String>, text: impl Into<String>) -> Self {
        Self { token: token.into(), text: text.into() }
    }
}

/// Where detail links live and what a detail token looks like
#[derive(Debug, Clone)]
pub struct RowLinks {
    selectors: LinkSelectors,
    detail_path_part: String,
}

impl RowLinks {
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            selectors: LinkSelectors { in_table: config.row_link_selector(), anywhere: config.any_link_selector() },
            detail_path_part: config.detail_path_part.clone(),
        }
    }

    /// One batched read of every visible detail link
    pub fn read<V: View + ?Sized>(&self, view: &V) -> Result<Vec<LinkSnapshot>> {
        view.link_snapshots(&self.selectors)
    }

    pub fn is_detail_token(&self, href: &str) -> bool {
        href.contains(&self.detail_path_part)
    }

    /// Detail tokens of `snapshots` in render order, repeats kept
    pub fn tokens<'s>(&'s self, snapshots: &'s [LinkSnapshot]) -> impl Iterator<Item = &'s str> + 's {
        snapshots
            .iter()
            .filter_map(|link| link.href.as_deref())
            .filter(|href| !href.is_empty() && self.is_detail_token(href))
    }
}

/// Turns the visible table into the list of rows still to process
#[derive(Debug, Clone)]
pub struct RowEnumerator {
    links: RowLinks,
}

impl RowEnumerator {
    pub fn new(links: RowLinks) -> Self {
        Self { links }
    }

    /// Unvisited rows currently visible, in render order, each token at most once
    pub fn enumerate_new_rows<V: View + ?Sized>(&self, view: &V, visited: &VisitedSet) -> Result<Vec<RowReference>> {
        let snapshots = self.links.read(view)?;
        Ok(self.filter_new(snapshots, visited))
    }

    /// Drop links without a detail token, already visited ones, and in-batch repeats
    pub fn filter_new(&self, snapshots: Vec<LinkSnapshot>, visited: &VisitedSet) -> Vec<RowReference> {
        let mut seen = HashSet::new();
        let mut rows = Vec::new();

        for link in snapshots {
            let Some(token) = link.href else { continue };
            if token.is_empty() || !self.links.is_detail_token(&token) {
                continue;
            }
            if visited.contains(&token) || !seen.insert(token.clone()) {
                continue;
            }
            rows.push(RowReference { token, text: link.text });
        }

        rows
    }
}
