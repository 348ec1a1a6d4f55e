//! Capability traits the session core is driven through.
//!
//! The controller never talks to the network directly. It gets a
//! `ChatTransport` for request/response exchanges and a `Beacon` for
//! fire-and-forget notifications, so tests can swap both for fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChatRequest, ChatResponse};

/// One request/response round trip with the chat service.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `request` to `/chat` and decode the reply.
    ///
    /// Non-success responses must map to `Error::Transport` carrying the
    /// response body.
    async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// Best-effort, fire-and-forget delivery.
///
/// Implementations must return without waiting on the network and must
/// swallow every failure. Which underlying mechanism got the payload out is
/// not visible to the caller.
pub trait Beacon: Send + Sync {
    fn send_best_effort(&self, url: &str, body: serde_json::Value);
}
