//! Bounded polling shared by every wait in the engine

use crate::{driver::{TextPattern, TextSearchable},
            error::{CrawlError, Result}};
use std::time::Duration;

/// How often to probe and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub budget: Duration,
}

impl PollPolicy {
    pub fn new(interval: Duration, budget: Duration) -> Self {
        Self { interval, budget }
    }
}

/// Result of a bounded poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Matched(T),
    TimedOut,
}

impl<T> PollOutcome<T> {
    pub fn matched(self) -> Option<T> {
        match self {
            Self::Matched(value) => Some(value),
            Self::TimedOut => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Call `probe` until it yields a value or the budget is spent
///
/// The budget is consumed by the intervals actually slept, not by wall-clock time, so a slow
/// probe never shortens the number of attempts. Probe errors are returned immediately.
pub fn poll_until<T, P, S>(policy: &PollPolicy, mut probe: P, mut sleep: S) -> Result<PollOutcome<T>>
where
    P: FnMut() -> Result<Option<T>>,
    S: FnMut(Duration),
{
    let mut waited = Duration::ZERO;
    while waited < policy.budget {
        if let Some(value) = probe()? {
            return Ok(PollOutcome::Matched(value));
        }
        sleep(policy.interval);
        waited += policy.interval;
    }
    Ok(PollOutcome::TimedOut)
}

/// Poll `surface` until an element matching `pattern` renders, returning its text
pub fn wait_for_text<S>(surface: &S, pattern: &TextPattern, interval: Duration, budget: Duration) -> Result<String>
where
    S: TextSearchable + ?Sized,
{
    let policy = PollPolicy::new(interval, budget);
    poll_until(&policy, || surface.find_first_text(pattern), |d| surface.pause(d))?
        .matched()
        .ok_or_else(|| CrawlError::timeout(format!("text /{}/", pattern.source()), budget))
}
