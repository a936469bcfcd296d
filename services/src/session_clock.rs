//! Live countdown for an attendance session's validity window.
//!
//! The clock is a lightweight once-per-second re-check, not a precise timer:
//! each tick compares the wall clock against the configured expiry and
//! publishes the result over a watch channel. The transition to `Expired` is
//! one-way; once reached the background task stops ticking, and dropping the
//! clock aborts the task so no periodic work leaks past the owning view.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Countdown state published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum CountdownState {
    /// No expiry configured; the session never expires.
    Unbounded,
    /// Still valid, with the remaining window at the last tick.
    Active { remaining: Duration },
    /// Terminal: the expiry has passed.
    Expired,
}

pub struct SessionClock {
    state: watch::Receiver<CountdownState>,
    task: Option<JoinHandle<()>>,
}

impl SessionClock {
    /// Starts a clock for the given optional expiry.
    ///
    /// An expiry already in the past yields a clock that is `Expired` from
    /// the outset, without spawning any task.
    pub fn start(expired_at: Option<DateTime<Utc>>) -> Self {
        let Some(expiry) = expired_at else {
            let (_tx, rx) = watch::channel(CountdownState::Unbounded);
            return Self {
                state: rx,
                task: None,
            };
        };

        let now = Utc::now();
        if now >= expiry {
            let (_tx, rx) = watch::channel(CountdownState::Expired);
            return Self {
                state: rx,
                task: None,
            };
        }

        let (tx, rx) = watch::channel(CountdownState::Active {
            remaining: expiry - now,
        });

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; skip it so the loop
            // re-evaluates roughly once per second from now on.
            interval.tick().await;

            loop {
                interval.tick().await;
                let now = Utc::now();
                if now >= expiry {
                    let _ = tx.send(CountdownState::Expired);
                    break;
                }
                if tx
                    .send(CountdownState::Active {
                        remaining: expiry - now,
                    })
                    .is_err()
                {
                    // All receivers gone; stop ticking.
                    break;
                }
            }
        });

        Self {
            state: rx,
            task: Some(task),
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(*self.state.borrow(), CountdownState::Expired)
    }

    /// Remaining window as of the last re-check. `None` means no expiry is
    /// configured; an expired session reports zero.
    pub fn remaining(&self) -> Option<Duration> {
        match &*self.state.borrow() {
            CountdownState::Unbounded => None,
            CountdownState::Active { remaining } => Some(*remaining),
            CountdownState::Expired => Some(Duration::zero()),
        }
    }

    /// Subscribe to countdown updates.
    pub fn subscribe(&self) -> watch::Receiver<CountdownState> {
        self.state.clone()
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}
