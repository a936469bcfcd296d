//! Bounded retry tracking for the face-match capture flow.

use std::collections::HashMap;
use std::sync::Mutex;

/// Hard ceiling on face-match attempts per session.
pub const MAX_ATTEMPTS: u8 = 5;

/// Outcome of recording a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Attempt `k` of MAX failed; the student may retry.
    Retry(u8),
    /// The ceiling has been reached; the capture flow terminates and the
    /// client navigates back to the session detail view.
    Exhausted,
}

/// Per-(session, student) attempt counters, starting at 0.
///
/// Counters only ever increase; they reset when a new session starts (a new
/// session id means a fresh key) or when a match finally succeeds.
#[derive(Debug, Default)]
pub struct AttemptTracker {
    counts: Mutex<HashMap<(String, String), u8>>,
}

impl AttemptTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one failed face-match attempt.
    pub fn record_failure(&self, session_id: &str, nim: &str) -> AttemptOutcome {
        let mut counts = self.counts.lock().expect("attempt tracker poisoned");
        let count = counts
            .entry((session_id.to_owned(), nim.to_owned()))
            .or_insert(0);
        *count = count.saturating_add(1).min(MAX_ATTEMPTS);

        if *count >= MAX_ATTEMPTS {
            AttemptOutcome::Exhausted
        } else {
            AttemptOutcome::Retry(*count)
        }
    }

    /// Current attempt count for a session/student pair.
    pub fn attempts(&self, session_id: &str, nim: &str) -> u8 {
        let counts = self.counts.lock().expect("attempt tracker poisoned");
        counts
            .get(&(session_id.to_owned(), nim.to_owned()))
            .copied()
            .unwrap_or(0)
    }

    /// Clears the counter after a successful match.
    pub fn clear(&self, session_id: &str, nim: &str) {
        let mut counts = self.counts.lock().expect("attempt tracker poisoned");
        counts.remove(&(session_id.to_owned(), nim.to_owned()));
    }
}
