//! In-memory transport and beacon used by the unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::transport::{Beacon, ChatTransport};
use crate::types::{ChatRequest, ChatResponse};

/// Scripted chat service that records every request it sees.
#[derive(Default)]
pub(crate) struct FakeTransport {
    script: Mutex<VecDeque<Result<ChatResponse>>>,
    requests: Mutex<Vec<ChatRequest>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, response: impl Into<String>, session_id: impl Into<String>) {
        self.script.lock().unwrap().push_back(Ok(ChatResponse {
            response: response.into(),
            session_id: session_id.into(),
            email_id: None,
        }));
    }

    pub fn fail(&self, status: u16, body: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(Error::transport(Some(status), body)));
    }

    /// Make the next exchange wait until the returned `Notify` fires.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::transport(None, "no scripted reply")))
    }
}

/// Beacon that keeps what it was asked to send.
#[derive(Default)]
pub(crate) struct RecordingBeacon {
    sent: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingBeacon {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<(String, serde_json::Value)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Beacon for RecordingBeacon {
    fn send_best_effort(&self, url: &str, body: serde_json::Value) {
        self.sent.lock().unwrap().push((url.to_string(), body));
    }
}
