use crate::canvas::ColorError;
use crate::economy::EconomyError;
use crate::presence::{IdentityError, PresenceError};
use std::fmt;

/// Request-level failures. All are local to one request; none close the
/// connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    BudgetExhausted,
    CooldownActive,
    OutOfBounds { x: i64, y: i64 },
    InvalidColor(ColorError),
    DuplicateIdentity(String),
    InvalidIdentity(IdentityError),
    EmptyMessage,
    MessageTooLong(usize),
    NotJoined,
    AlreadyJoined,
    Malformed(String),
}

impl GatewayError {
    /// Stable machine-readable code for the `error` event
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::BudgetExhausted => "budget_exhausted",
            GatewayError::CooldownActive => "cooldown_active",
            GatewayError::OutOfBounds { .. } => "out_of_bounds",
            GatewayError::InvalidColor(_) => "invalid_color",
            GatewayError::DuplicateIdentity(_) => "duplicate_identity",
            GatewayError::InvalidIdentity(_) => "invalid_identity",
            GatewayError::EmptyMessage => "empty_message",
            GatewayError::MessageTooLong(_) => "message_too_long",
            GatewayError::NotJoined => "not_joined",
            GatewayError::AlreadyJoined => "already_joined",
            GatewayError::Malformed(_) => "malformed",
        }
    }

    /// Whether the client is told about this error.
    ///
    /// Cooldown is a debounce; bad coordinates and colors are client bugs.
    /// Those are only logged.
    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            GatewayError::CooldownActive
                | GatewayError::OutOfBounds { .. }
                | GatewayError::InvalidColor(_)
        )
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::BudgetExhausted => {
                write!(f, "no pixels available, wait for regeneration")
            }
            GatewayError::CooldownActive => write!(f, "draw cooldown active"),
            GatewayError::OutOfBounds { x, y } => {
                write!(f, "coordinate ({}, {}) is outside the canvas", x, y)
            }
            GatewayError::InvalidColor(e) => write!(f, "{}", e),
            GatewayError::DuplicateIdentity(identity) => write!(
                f,
                "identity '{}' is already in use, choose another",
                identity
            ),
            GatewayError::InvalidIdentity(e) => write!(f, "{}", e),
            GatewayError::EmptyMessage => write!(f, "message is empty"),
            GatewayError::MessageTooLong(max) => {
                write!(f, "message must be at most {} characters", max)
            }
            GatewayError::NotJoined => write!(f, "join before drawing or chatting"),
            GatewayError::AlreadyJoined => write!(f, "this connection has already joined"),
            GatewayError::Malformed(msg) => write!(f, "malformed message: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<EconomyError> for GatewayError {
    fn from(e: EconomyError) -> Self {
        match e {
            EconomyError::BudgetExhausted => GatewayError::BudgetExhausted,
            EconomyError::CooldownActive => GatewayError::CooldownActive,
            EconomyError::UnknownParticipant => GatewayError::NotJoined,
        }
    }
}

impl From<PresenceError> for GatewayError {
    fn from(e: PresenceError) -> Self {
        match e {
            PresenceError::Duplicate(identity) => GatewayError::DuplicateIdentity(identity),
        }
    }
}

impl From<IdentityError> for GatewayError {
    fn from(e: IdentityError) -> Self {
        GatewayError::InvalidIdentity(e)
    }
}

impl From<ColorError> for GatewayError {
    fn from(e: ColorError) -> Self {
        GatewayError::InvalidColor(e)
    }
}
