//! Email-gated chat session management.
//!
//! ## Session Flow
//!
//! ```text
//! Widget Mount
//!   │
//!   └─► Empty session (no identity, no session id)
//!
//! Identity Submission
//!   │
//!   ├─► Validate email shape (no network on failure)
//!   │
//!   ├─► Mark established, append "My email is: ..."
//!   │
//!   └─► First exchange, keyed on the email
//!
//! Message Exchange
//!   │
//!   ├─► Append user message (optimistic)
//!   │
//!   ├─► POST /chat with the last server-assigned session id
//!   │
//!   └─► Append reply or error text
//! ```

mod controller;
mod identity;

pub use controller::*;
pub use identity::validate_identity;
