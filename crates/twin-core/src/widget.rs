//! Mount/teardown wiring for one chat widget instance.
//!
//! `ChatWidget` owns a controller, an activity tracker, the idle monitor and
//! the lifecycle hooks, and connects them the way a mounted widget needs:
//!
//! - identity accepted → hooks armed, idle monitor armed
//! - idle threshold exceeded → `Trigger::IdleTimeout`
//! - page unload / hide → `teardown(..)` fires the trigger, then disarms
//! - drop → every timer released

use std::sync::Arc;
use tracing::debug;

use crate::activity::{ActivityKind, ActivityTracker};
use crate::error::Result;
use crate::hooks::{LifecycleHooks, Trigger};
use crate::idle::{IdleConfig, IdleMonitor, MonitorState};
use crate::session::{SendOutcome, SessionController};
use crate::signal::TerminationSignaler;
use crate::transport::{Beacon, ChatTransport};
use crate::types::{Message, Session};

/// Default chat service endpoint for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Settings a widget is mounted with.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Chat service base URL, without the `/chat` suffix.
    pub base_url: String,
    pub idle: IdleConfig,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            idle: IdleConfig::default(),
        }
    }
}

/// A mounted chat widget.
pub struct ChatWidget {
    controller: SessionController,
    activity: ActivityTracker,
    signaler: Arc<TerminationSignaler>,
    hooks: Arc<LifecycleHooks>,
    monitor: Arc<IdleMonitor>,
}

impl ChatWidget {
    /// Mount a widget with an empty session. Nothing is armed until an
    /// identity is accepted.
    pub fn mount(
        config: &WidgetConfig,
        transport: Arc<dyn ChatTransport>,
        beacon: Arc<dyn Beacon>,
    ) -> Self {
        let activity = ActivityTracker::new();
        let signaler = Arc::new(TerminationSignaler::new(&config.base_url, beacon));
        let monitor = Arc::new(IdleMonitor::new(activity.clone(), config.idle));

        // The hooks need the controller's session view and the controller
        // needs to arm the hooks, so the view is taken from a bare
        // controller and the listener attached afterwards.
        let bare = SessionController::new(transport, activity.clone());
        let hooks = Arc::new(LifecycleHooks::new(Arc::clone(&signaler), bare.view()));

        let arm_hooks = Arc::clone(&hooks);
        let arm_monitor = Arc::clone(&monitor);
        let controller = bare.on_established(move || {
            arm_hooks.arm();
            let idle_hooks = Arc::clone(&arm_hooks);
            arm_monitor.arm(move || {
                idle_hooks.fire(Trigger::IdleTimeout);
            });
        });

        debug!(base_url = %config.base_url, "widget mounted");

        Self {
            controller,
            activity,
            signaler,
            hooks,
            monitor,
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    pub fn signaler(&self) -> &TerminationSignaler {
        &self.signaler
    }

    pub fn hooks(&self) -> &LifecycleHooks {
        &self.hooks
    }

    pub fn idle_state(&self) -> MonitorState {
        self.monitor.state()
    }

    pub fn session(&self) -> Result<Session> {
        self.controller.session()
    }

    pub fn messages(&self) -> Result<Vec<Message>> {
        self.controller.messages()
    }

    /// Forward a user interaction to the activity clock.
    pub fn record_activity(&self, kind: ActivityKind) {
        self.activity.record(kind);
    }

    pub async fn submit_identity(&self, identity: &str) -> Result<()> {
        self.controller.submit_identity(identity).await
    }

    pub async fn send_message(&self, text: &str) -> Result<SendOutcome> {
        self.controller.send_message(text).await
    }

    /// Deliver a page event while the widget stays mounted.
    pub fn trigger(&self, trigger: Trigger) -> bool {
        self.hooks.fire(trigger)
    }

    /// Unmount. Fires `trigger` (if any, and if armed) and then releases
    /// every hook and timer.
    pub fn teardown(self, trigger: Option<Trigger>) {
        if let Some(trigger) = trigger {
            self.hooks.fire(trigger);
        }
        // Drop does the rest.
    }
}

impl Drop for ChatWidget {
    fn drop(&mut self) {
        self.monitor.disarm();
        self.hooks.disarm();
        debug!("widget torn down");
    }
}
