//! twin-core - Core library for twin-chat
//!
//! This crate provides the client-side session lifecycle of the chat widget:
//!
//! - **session**: Email-gated session and message exchange
//! - **activity**: Last-interaction clock
//! - **idle**: Idle detection on a fixed cadence
//! - **signal**: Fire-and-forget session termination
//! - **hooks**: Idle / unload / page-hide triggers
//! - **widget**: Mount and teardown wiring
//! - **client**: reqwest transport and beacon (feature `client`)

pub mod activity;
#[cfg(feature = "client")]
pub mod client;
pub mod error;
pub mod hooks;
pub mod idle;
pub mod session;
pub mod signal;
pub mod transport;
pub mod types;
pub mod widget;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use error::{Error, Result, ValidationError};
pub use hooks::Trigger;
pub use widget::{ChatWidget, WidgetConfig};
