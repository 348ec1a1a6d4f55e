//! Session controller: the only writer of `Session` and the message log.

use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::activity::{ActivityKind, ActivityTracker};
use crate::error::{Error, Result};
use crate::transport::ChatTransport;
use crate::types::{ChatRequest, Message, MessageLog, Session};

use super::identity::validate_identity;

/// Assistant-side text appended when an exchange fails.
pub const EXCHANGE_ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// What `send_message` did with its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The message went out and a reply was appended.
    Delivered,
    /// Blank input, or another exchange was still in flight.
    Ignored,
}

#[derive(Debug, Default)]
struct ControllerState {
    session: Session,
    log: MessageLog,
    loading: bool,
}

/// Read-only view of the controller's session, shared with lifecycle hooks.
#[derive(Debug, Clone)]
pub struct SessionView {
    state: Arc<Mutex<ControllerState>>,
}

impl SessionView {
    /// Snapshot of the current session values.
    pub fn snapshot(&self) -> Session {
        self.state
            .lock()
            .map(|state| state.session.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().session.clone())
    }
}

/// Clears the loading flag when the exchange finishes or its future is dropped.
struct InFlight {
    state: Arc<Mutex<ControllerState>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.loading = false;
    }
}

type EstablishedListener = Box<dyn Fn() + Send + Sync>;

/// Owns the conversation and mediates every exchange with the chat service.
pub struct SessionController {
    transport: Arc<dyn ChatTransport>,
    activity: ActivityTracker,
    state: Arc<Mutex<ControllerState>>,
    on_established: Option<EstablishedListener>,
}

impl SessionController {
    /// Create a controller with an empty session and log.
    pub fn new(transport: Arc<dyn ChatTransport>, activity: ActivityTracker) -> Self {
        Self {
            transport,
            activity,
            state: Arc::new(Mutex::new(ControllerState::default())),
            on_established: None,
        }
    }

    /// Run `listener` as soon as an identity is accepted, before the first
    /// exchange goes out.
    pub fn on_established<F>(mut self, listener: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_established = Some(Box::new(listener));
        self
    }

    /// Read-only handle for components that need current session values.
    pub fn view(&self) -> SessionView {
        SessionView {
            state: Arc::clone(&self.state),
        }
    }

    pub fn session(&self) -> Result<Session> {
        Ok(self.state.lock()?.session.clone())
    }

    /// Snapshot of the message log, in display order.
    pub fn messages(&self) -> Result<Vec<Message>> {
        Ok(self.state.lock()?.log.to_vec())
    }

    pub fn is_loading(&self) -> Result<bool> {
        Ok(self.state.lock()?.loading)
    }

    pub fn is_established(&self) -> Result<bool> {
        Ok(self.state.lock()?.session.is_established())
    }

    /// Submit the user's email and run the first exchange.
    ///
    /// Validation failures return before anything is touched. Once the
    /// shape check passes the session is established even if the exchange
    /// then fails; in that case an error reply is appended to the log and
    /// the transport error is returned.
    pub async fn submit_identity(&self, identity: &str) -> Result<()> {
        validate_identity(identity)?;

        let (request, _in_flight) = {
            let mut state = self.state.lock()?;
            if state.session.is_established() {
                return Err(Error::AlreadyEstablished);
            }
            if state.loading {
                return Err(Error::Busy);
            }

            self.activity.record(ActivityKind::IdentitySubmit);
            state.session.establish(identity);

            let content = format!("My email is: {}", identity);
            state.log.push(Message::user(content.clone()));

            let request = ChatRequest {
                message: content,
                email_id: identity.to_string(),
                session_id: state.session.session_key().to_string(),
            };
            (request, self.begin_exchange(&mut state))
        };

        info!(email_id = %identity, "identity submitted");
        if let Some(listener) = &self.on_established {
            listener();
        }

        if let Err(e) = self.exchange(&request).await {
            warn!(error = %e, email_id = %identity, "first exchange failed");
            self.append_error_reply()?;
            return Err(e);
        }
        Ok(())
    }

    /// Send a free-form message.
    ///
    /// Blank input and calls made while another exchange is outstanding are
    /// dropped (not queued). The user message is appended before the
    /// request goes out.
    pub async fn send_message(&self, text: &str) -> Result<SendOutcome> {
        let (request, _in_flight) = {
            let mut state = self.state.lock()?;
            if text.trim().is_empty() || state.loading {
                return Ok(SendOutcome::Ignored);
            }
            if !state.session.is_established() {
                return Err(Error::NotEstablished);
            }

            self.activity.record(ActivityKind::MessageSend);
            state.log.push(Message::user(text));

            let request = ChatRequest {
                message: text.to_string(),
                email_id: state.session.identity().to_string(),
                session_id: state.session.session_key().to_string(),
            };
            (request, self.begin_exchange(&mut state))
        };

        match self.exchange(&request).await {
            Ok(()) => Ok(SendOutcome::Delivered),
            Err(e) => {
                warn!(error = %e, session_id = %request.session_id, "exchange failed");
                self.append_error_reply()?;
                Err(e)
            }
        }
    }

    fn begin_exchange(&self, state: &mut ControllerState) -> InFlight {
        state.loading = true;
        InFlight {
            state: Arc::clone(&self.state),
        }
    }

    async fn exchange(&self, request: &ChatRequest) -> Result<()> {
        debug!(session_id = %request.session_id, "chat exchange");
        let response = self.transport.exchange(request).await?;

        let mut state = self.state.lock()?;
        if state.session.session_id() != response.session_id {
            debug!(
                previous = %state.session.session_key(),
                assigned = %response.session_id,
                "session id assigned by service"
            );
        }
        state.session.assign_session_id(response.session_id);
        state.log.push(Message::assistant(response.response));
        Ok(())
    }

    fn append_error_reply(&self) -> Result<()> {
        self.state
            .lock()?
            .log
            .push(Message::assistant(EXCHANGE_ERROR_REPLY));
        Ok(())
    }
}
