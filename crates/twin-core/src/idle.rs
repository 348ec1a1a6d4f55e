//! Idle detection.
//!
//! Once armed, the monitor wakes on a fixed cadence and compares the time
//! since the last recorded activity with the idle threshold. The first check
//! that finds the threshold exceeded runs the idle callback and stops the
//! monitor for good.
//!
//! ```text
//! Disarmed ──arm()──► Armed ──threshold exceeded──► Signaled
//!    ▲                  │
//!    └────disarm()──────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, trace};

use crate::activity::ActivityTracker;

/// Default wake-up cadence.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Shortest cadence the monitor runs at.
pub const MIN_CHECK_INTERVAL: Duration = Duration::from_millis(1);

/// Default inactivity allowed before a session counts as abandoned.
pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleConfig {
    /// How often the monitor wakes up to look at the activity clock.
    pub check_interval: Duration,
    /// Idle time that must be exceeded before the callback fires.
    pub idle_threshold: Duration,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No identity yet, or torn down.
    Disarmed,
    /// Waking up every `check_interval`.
    Armed,
    /// Idle callback has run. Terminal.
    Signaled,
}

#[derive(Debug)]
struct MonitorInner {
    state: MonitorState,
    task: Option<tokio::task::AbortHandle>,
}

/// Timer-driven idle watchdog over an [`ActivityTracker`].
pub struct IdleMonitor {
    config: IdleConfig,
    activity: ActivityTracker,
    inner: Arc<Mutex<MonitorInner>>,
    checks: Arc<AtomicU64>,
}

impl IdleMonitor {
    /// Create a disarmed monitor. A `check_interval` below
    /// [`MIN_CHECK_INTERVAL`] is raised to it.
    pub fn new(activity: ActivityTracker, config: IdleConfig) -> Self {
        let config = IdleConfig {
            check_interval: config.check_interval.max(MIN_CHECK_INTERVAL),
            ..config
        };
        Self {
            config,
            activity,
            inner: Arc::new(Mutex::new(MonitorInner {
                state: MonitorState::Disarmed,
                task: None,
            })),
            checks: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> IdleConfig {
        self.config
    }

    pub fn state(&self) -> MonitorState {
        self.lock().state
    }

    /// Number of idle checks that have run.
    pub fn checks_run(&self) -> u64 {
        self.checks.load(Ordering::Relaxed)
    }

    /// Start watching. `on_idle` runs at most once, on the runtime's thread.
    ///
    /// Arming an already armed or already signaled monitor does nothing, so
    /// callers may re-arm freely (for example after every exchange) without
    /// risking a second signal. Must be called from within a tokio runtime.
    pub fn arm<F>(&self, on_idle: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut inner = self.lock();
        if inner.state != MonitorState::Disarmed {
            trace!(state = ?inner.state, "idle monitor already armed");
            return;
        }

        let IdleConfig {
            check_interval,
            idle_threshold,
        } = self.config;
        let activity = self.activity.clone();
        let shared = Arc::clone(&self.inner);
        let checks = Arc::clone(&self.checks);

        info!(
            check_secs = check_interval.as_secs(),
            threshold_secs = idle_threshold.as_secs(),
            "Starting idle monitor"
        );

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + check_interval, check_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                checks.fetch_add(1, Ordering::Relaxed);

                let idle = activity.idle_for();
                if idle <= idle_threshold {
                    trace!(idle_secs = idle.as_secs(), "session active");
                    continue;
                }

                {
                    let mut inner = shared
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    if inner.state != MonitorState::Armed {
                        return;
                    }
                    inner.state = MonitorState::Signaled;
                    inner.task = None;
                }

                info!(idle_secs = idle.as_secs(), "Idle threshold exceeded");
                on_idle();
                return;
            }
        });

        inner.state = MonitorState::Armed;
        inner.task = Some(handle.abort_handle());
    }

    /// Cancel the pending wake-up. A signaled monitor stays signaled.
    pub fn disarm(&self) {
        let mut inner = self.lock();
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        if inner.state == MonitorState::Armed {
            debug!("Stopping idle monitor");
            inner.state = MonitorState::Disarmed;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MonitorInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for IdleMonitor {
    fn drop(&mut self) {
        self.disarm();
    }
}
