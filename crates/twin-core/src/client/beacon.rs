//! Fire-and-forget delivery for close signals.
//!
//! The beacon first queues the request on the current tokio runtime. When
//! no runtime is reachable (the process is already tearing it down), it
//! hands the request to a detached keep-alive thread that brings its own
//! single-threaded runtime. Either way the caller returns immediately and
//! never sees a failure.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::Beacon;

/// Default time a single beacon request may take.
pub const DEFAULT_BEACON_TIMEOUT: Duration = Duration::from_secs(5);

/// Best-effort `POST` sender backed by reqwest.
#[derive(Clone)]
pub struct HttpBeacon {
    client: reqwest::Client,
    timeout: Duration,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl HttpBeacon {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_BEACON_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Other(format!("Failed to create beacon client: {}", e)))?;

        Ok(Self {
            client,
            timeout,
            pending: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Wait up to `grace` for queued beacons to finish.
    ///
    /// Intended for the moment right before a process exits; whatever is
    /// still in flight after `grace` is abandoned.
    pub async fn flush(&self, grace: Duration) {
        let handles = std::mem::take(&mut *self.lock_pending());
        if handles.is_empty() {
            return;
        }

        let count = handles.len();
        let drained = tokio::time::timeout(grace, async {
            for handle in handles {
                let _ = handle.await;
            }
        })
        .await;

        if drained.is_err() {
            debug!(count, "beacon flush timed out");
        }
    }

    fn queue(&self, handle: &tokio::runtime::Handle, url: String, body: serde_json::Value) {
        let task = handle.spawn(deliver(self.client.clone(), url, body, self.timeout));
        let mut pending = self.lock_pending();
        pending.retain(|h| !h.is_finished());
        pending.push(task);
    }

    fn keep_alive(&self, url: String, body: serde_json::Value) {
        let timeout = self.timeout;
        let spawned = std::thread::Builder::new()
            .name("twin-beacon".into())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        debug!(error = %e, "beacon runtime unavailable");
                        return;
                    }
                };
                // Connections from another runtime's pool are unusable here.
                let client = match reqwest::Client::builder().build() {
                    Ok(client) => client,
                    Err(e) => {
                        debug!(error = %e, "beacon client unavailable");
                        return;
                    }
                };
                runtime.block_on(deliver(client, url, body, timeout));
            });

        if let Err(e) = spawned {
            debug!(error = %e, "beacon thread unavailable");
        }
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Beacon for HttpBeacon {
    fn send_best_effort(&self, url: &str, body: serde_json::Value) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => self.queue(&handle, url.to_string(), body),
            Err(_) => self.keep_alive(url.to_string(), body),
        }
    }
}

async fn deliver(client: reqwest::Client, url: String, body: serde_json::Value, timeout: Duration) {
    match client.post(&url).json(&body).timeout(timeout).send().await {
        Ok(resp) if resp.status().is_success() => debug!(%url, "beacon delivered"),
        Ok(resp) => debug!(%url, status = resp.status().as_u16(), "beacon rejected"),
        Err(e) => debug!(%url, error = %e, "beacon failed"),
    }
}
