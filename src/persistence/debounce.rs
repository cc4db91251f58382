//! Pending-save timer.
//!
//! Every settings mutation calls [`DebouncedSave::schedule`], which cancels
//! any pending save and starts the delay again. The event loop polls the
//! timer and writes the snapshot once it fires.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebouncedSave {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebouncedSave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending save and reschedule it `delay` after `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the pending save is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for DebouncedSave {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}
