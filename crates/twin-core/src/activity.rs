//! User activity tracking.
//!
//! `ActivityTracker` is a cheap cloneable handle around the last-interaction
//! timestamp. The session controller writes to it, the idle monitor reads it.

use std::sync::{Arc, Mutex};
use tokio::time::{Duration, Instant};
use tracing::trace;

/// Kinds of interaction that count as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    PointerMove,
    KeyPress,
    Scroll,
    InputEdit,
    MessageSend,
    IdentitySubmit,
}

/// Records when the user last interacted with the widget.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    last_activity_at: Arc<Mutex<Instant>>,
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityTracker {
    /// Create a tracker whose clock starts now.
    pub fn new() -> Self {
        Self {
            last_activity_at: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Mark "now" as the latest activity. Last write wins.
    pub fn record_activity(&self) {
        self.touch(Instant::now());
    }

    /// Same as `record_activity`, tagged with what the user did.
    pub fn record(&self, kind: ActivityKind) {
        trace!(?kind, "activity");
        self.record_activity();
    }

    pub fn last_activity_at(&self) -> Instant {
        *self
            .last_activity_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Time elapsed since the last recorded activity.
    pub fn idle_for(&self) -> Duration {
        Instant::now().saturating_duration_since(self.last_activity_at())
    }

    fn touch(&self, at: Instant) {
        let mut last = self
            .last_activity_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Never move backwards.
        if at > *last {
            *last = at;
        }
    }
}
