//! Lifecycle hooks that end a session.
//!
//! Three independent triggers end a session: the idle monitor giving up,
//! the page being unloaded, and the page being hidden for teardown (mobile
//! tab close, where unload may never fire). Each one sends a close signal
//! with whatever session values are current at that moment.
//!
//! Triggers are only registered once an identity exists and are dropped on
//! teardown. They do not deduplicate against each other: if the idle
//! timeout and a tab close race, the service hears about it twice.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::session::SessionView;
use crate::signal::TerminationSignaler;

/// Event that ends a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Idle threshold exceeded.
    IdleTimeout,
    /// Navigating away, closing the tab or window.
    BeforeUnload,
    /// Page hidden for teardown.
    PageHide,
}

impl Trigger {
    pub const ALL: [Trigger; 3] = [Trigger::IdleTimeout, Trigger::BeforeUnload, Trigger::PageHide];
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::IdleTimeout => write!(f, "idle_timeout"),
            Trigger::BeforeUnload => write!(f, "before_unload"),
            Trigger::PageHide => write!(f, "page_hide"),
        }
    }
}

/// Registry of the termination triggers for one widget instance.
pub struct LifecycleHooks {
    signaler: Arc<TerminationSignaler>,
    session: SessionView,
    registered: Mutex<HashSet<Trigger>>,
}

impl LifecycleHooks {
    pub fn new(signaler: Arc<TerminationSignaler>, session: SessionView) -> Self {
        Self {
            signaler,
            session,
            registered: Mutex::new(HashSet::new()),
        }
    }

    /// Register all triggers. Called once the identity is established.
    pub fn arm(&self) {
        let mut registered = self.lock();
        if registered.len() == Trigger::ALL.len() {
            return;
        }
        registered.extend(Trigger::ALL);
        debug!("lifecycle hooks armed");
    }

    /// Unregister all triggers.
    pub fn disarm(&self) {
        let mut registered = self.lock();
        if !registered.is_empty() {
            registered.clear();
            debug!("lifecycle hooks disarmed");
        }
    }

    pub fn is_armed(&self, trigger: Trigger) -> bool {
        self.lock().contains(&trigger)
    }

    /// Handle `trigger`. Returns whether a close signal was sent.
    pub fn fire(&self, trigger: Trigger) -> bool {
        if !self.is_armed(trigger) {
            debug!(%trigger, "trigger not armed, ignoring");
            return false;
        }

        let session = self.session.snapshot();
        info!(%trigger, session_id = %session.session_key(), "session ending");
        self.signaler.signal_session(&session);
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<Trigger>> {
        self.registered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
