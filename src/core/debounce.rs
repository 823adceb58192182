// src/core/debounce.rs
use std::time::{Duration, Instant};

/// Coalesces bursts of user-visible notices into a single toast.
///
/// One pending slot, last-write-wins: scheduling a notice replaces any
/// notice already waiting and restarts the window. The driving loop polls
/// `take_due` with the current time and shows whatever falls out, so only
/// the final notice of a burst ever reaches the user.
#[derive(Debug)]
pub struct NoticeDebouncer {
    window: Duration,
    pending: Option<PendingNotice>,
}

#[derive(Debug)]
struct PendingNotice {
    message: String,
    due_at: Instant,
}

impl NoticeDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Schedule a notice, cancelling any notice still waiting.
    pub fn schedule(&mut self, message: String, now: Instant) {
        self.pending = Some(PendingNotice {
            message,
            due_at: now + self.window,
        });
    }

    /// Take the pending notice if its window has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        if self.pending.as_ref().is_some_and(|p| p.due_at <= now) {
            self.pending.take().map(|p| p.message)
        } else {
            None
        }
    }

    /// Drop the pending notice without showing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
