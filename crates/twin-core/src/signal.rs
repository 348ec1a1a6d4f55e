//! Session termination signalling.
//!
//! Tells the chat service a session is over by posting to `/chat-close`
//! through a [`Beacon`]. Delivery is at-least-once from the caller's side:
//! every real termination event sends, and the service is expected to
//! tolerate duplicates.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

use crate::transport::Beacon;
use crate::types::{CloseRequest, Session};

/// Sends the fire-and-forget "session ended" notification.
pub struct TerminationSignaler {
    close_url: String,
    beacon: Arc<dyn Beacon>,
    sent: AtomicUsize,
}

impl TerminationSignaler {
    pub fn new(base_url: &str, beacon: Arc<dyn Beacon>) -> Self {
        Self {
            close_url: format!("{}/chat-close", base_url.trim_end_matches('/')),
            beacon,
            sent: AtomicUsize::new(0),
        }
    }

    pub fn close_url(&self) -> &str {
        &self.close_url
    }

    /// Notify the service that the session keyed by `identity` has ended.
    ///
    /// Does nothing when no identity was ever submitted. Never fails: the
    /// beacon swallows delivery errors.
    pub fn signal_end(&self, identity: &str, session_id: &str) {
        if identity.is_empty() {
            debug!("no identity, skipping close signal");
            return;
        }

        let body = CloseRequest {
            session_id: if session_id.is_empty() {
                identity.to_string()
            } else {
                session_id.to_string()
            },
            email_id: identity.to_string(),
        };

        let payload = match serde_json::to_value(&body) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(error = %e, "failed to encode close signal");
                return;
            }
        };

        info!(session_id = %body.session_id, email_id = %body.email_id, "sending close signal");
        self.beacon.send_best_effort(&self.close_url, payload);
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    /// `signal_end` with the values of a session snapshot.
    pub fn signal_session(&self, session: &Session) {
        self.signal_end(session.identity(), session.session_id());
    }

    /// Number of close signals handed to the beacon so far.
    pub fn signals_sent(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBeacon;
    use serde_json::json;

    #[test]
    fn test_no_identity_is_noop() {
        let beacon = RecordingBeacon::new();
        let signaler = TerminationSignaler::new("http://localhost:8000", beacon.clone());

        signaler.signal_end("", "S1");
        signaler.signal_session(&Session::default());

        assert_eq!(beacon.count(), 0);
        assert_eq!(signaler.signals_sent(), 0);
    }

    #[test]
    fn test_close_body_and_url() {
        let beacon = RecordingBeacon::new();
        let signaler = TerminationSignaler::new("http://localhost:8000/", beacon.clone());

        signaler.signal_end("a@b.com", "S1");

        let sent = beacon.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "http://localhost:8000/chat-close");
        assert_eq!(sent[0].1, json!({"session_id": "S1", "email_id": "a@b.com"}));
    }

    #[test]
    fn test_unassigned_session_falls_back_to_identity() {
        let beacon = RecordingBeacon::new();
        let signaler = TerminationSignaler::new("http://svc", beacon.clone());

        signaler.signal_end("a@b.com", "");

        assert_eq!(
            beacon.sent()[0].1,
            json!({"session_id": "a@b.com", "email_id": "a@b.com"})
        );
    }

    #[test]
    fn test_repeated_calls_all_sent() {
        let beacon = RecordingBeacon::new();
        let signaler = TerminationSignaler::new("http://svc", beacon.clone());

        signaler.signal_end("a@b.com", "S1");
        signaler.signal_end("a@b.com", "S1");

        assert_eq!(beacon.count(), 2);
        assert_eq!(signaler.signals_sent(), 2);
    }
}
