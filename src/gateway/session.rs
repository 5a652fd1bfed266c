use super::{ClientMessage, GatewayError, ServerEvent, SessionGateway};
use crate::bus::Mailbox;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Connection lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a join
    Connecting,
    Active { identity: String },
    Closed,
}

/// Per-connection state machine: Connecting -> Active -> Closed.
///
/// Leaving presence happens exactly once, on the first `close` (or on drop).
pub struct Session {
    id: Uuid,
    state: SessionState,
    gateway: Arc<SessionGateway>,
    mailbox: Mailbox,
}

impl Session {
    pub fn new(gateway: Arc<SessionGateway>, mailbox: Mailbox) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Connecting,
            gateway,
            mailbox,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn identity(&self) -> Option<&str> {
        match &self.state {
            SessionState::Active { identity } => Some(identity),
            _ => None,
        }
    }

    /// Apply one inbound request
    pub fn handle(&mut self, msg: ClientMessage, now: Instant) -> Result<(), GatewayError> {
        match msg {
            ClientMessage::Join { identity } => {
                match self.state {
                    SessionState::Connecting => {}
                    SessionState::Active { .. } => return Err(GatewayError::AlreadyJoined),
                    SessionState::Closed => return Err(GatewayError::NotJoined),
                }
                let participant =
                    self.gateway
                        .join(&identity, self.id, self.mailbox.clone(), now)?;
                self.state = SessionState::Active {
                    identity: participant.identity,
                };
                Ok(())
            }
            ClientMessage::Draw { x, y, color } => {
                let identity = self.active_identity()?;
                self.gateway.draw(identity, x, y, &color, now).map(|_| ())
            }
            ClientMessage::Chat { content, recipient } => {
                let identity = self.active_identity()?;
                self.gateway
                    .chat(identity, &content, recipient.as_deref())
                    .map(|_| ())
            }
        }
    }

    fn active_identity(&self) -> Result<&str, GatewayError> {
        self.identity().ok_or(GatewayError::NotJoined)
    }

    /// Tell the client about a failed request, or just log it.
    pub fn report(&self, error: &GatewayError) {
        if error.is_user_visible() {
            debug!(session = %self.id, code = error.code(), "Request rejected");
            let _ = self
                .mailbox
                .send(ServerEvent::error(error.code(), error.to_string()));
        } else {
            debug!(session = %self.id, code = error.code(), "Request dropped silently");
        }
    }

    /// Transition to Closed. Returns true only on the call that left presence.
    pub fn close(&mut self) -> bool {
        let previous = std::mem::replace(&mut self.state, SessionState::Closed);
        match previous {
            SessionState::Active { identity } => {
                if !self.gateway.leave(&identity) {
                    warn!(session = %self.id, identity = %identity, "Session identity was not present");
                    return false;
                }
                info!(session = %self.id, identity = %identity, "Session closed");
                true
            }
            _ => false,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
