//! Shared types for twin-core.
//!
//! These types are used by both the session controller and the HTTP client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Entity Types
// ─────────────────────────────────────────────────────────────────────────────

/// Identity of one continuous conversation.
///
/// Only the session controller writes to a `Session`; everyone else gets a
/// cloned snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    session_id: String,
    identity: String,
    established: bool,
}

impl Session {
    /// Server-assigned session id. Empty until the first successful exchange.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The email the user is addressed by. Empty until submitted.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn is_established(&self) -> bool {
        self.established
    }

    /// Key sent as `session_id` on the wire: the server's id once assigned,
    /// the identity before that.
    pub fn session_key(&self) -> &str {
        if self.session_id.is_empty() {
            &self.identity
        } else {
            &self.session_id
        }
    }

    pub(crate) fn establish(&mut self, identity: &str) {
        self.identity = identity.to_string();
        self.established = true;
    }

    pub(crate) fn assign_session_id(&mut self, session_id: String) {
        self.session_id = session_id;
    }
}

/// Role of a message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    /// May contain inline markup; rendering is the front-end's concern.
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Append-only, insertion-ordered conversation log.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub email_id: String,
    pub session_id: String,
}

/// Response of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
}

/// Body of `POST /chat-close`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseRequest {
    pub session_id: String,
    pub email_id: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub use_s3: Option<bool>,
}

/// A message as the chat service stores it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoredMessage {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Response of `GET /conversation/{session_id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConversationResponse {
    pub session_id: String,
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
}
