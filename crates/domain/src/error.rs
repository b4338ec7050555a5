//! Error taxonomy surfaced to callers of the booking engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lifecycle::LifecycleError;
use crate::stay::DateRangeError;

/// Identifiable category of a [`BookingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad local input; no network call was made.
    Validation,
    /// The store refused on overlap or a business rule.
    Conflict,
    /// The store refused a specific field.
    Field,
    /// Network or server failure; the identical request may be retried.
    Transport,
    /// The target does not exist or can no longer be acted on.
    NotFound,
    /// The session is missing or no longer valid.
    Unauthorized,
    /// The caller lacks the privilege for the action.
    Forbidden,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Field => "field",
            ErrorKind::Transport => "transport",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported by booking operations: a human-readable message plus a kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{field}: {message}")]
    Field { field: String, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),
}

impl BookingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BookingError::Validation(message.into())
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        BookingError::Field {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::Validation(_) => ErrorKind::Validation,
            BookingError::Conflict(_) => ErrorKind::Conflict,
            BookingError::Field { .. } => ErrorKind::Field,
            BookingError::Transport(_) => ErrorKind::Transport,
            BookingError::NotFound(_) => ErrorKind::NotFound,
            BookingError::Unauthorized(_) => ErrorKind::Unauthorized,
            BookingError::Forbidden(_) => ErrorKind::Forbidden,
        }
    }

    /// The message without the field prefix.
    pub fn message(&self) -> &str {
        match self {
            BookingError::Field { message, .. } => message,
            BookingError::Validation(m)
            | BookingError::Conflict(m)
            | BookingError::Transport(m)
            | BookingError::NotFound(m)
            | BookingError::Unauthorized(m)
            | BookingError::Forbidden(m) => m,
        }
    }

    /// The offending field for [`ErrorKind::Field`] errors.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            BookingError::Field { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Returns true if re-sending the identical request is meaningful.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Transport(_))
    }
}

impl From<DateRangeError> for BookingError {
    fn from(err: DateRangeError) -> Self {
        BookingError::Validation(err.to_string())
    }
}

impl From<LifecycleError> for BookingError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotOwner { .. } => BookingError::Forbidden(err.to_string()),
            LifecycleError::NotCancellable { .. } => BookingError::NotFound(err.to_string()),
            LifecycleError::InvalidStay(inner) => inner.into(),
            LifecycleError::InvalidTransition { .. }
            | LifecycleError::NoRoomSelected
            | LifecycleError::RoomUnavailable { .. }
            | LifecycleError::MissingPayment => BookingError::Validation(err.to_string()),
        }
    }
}
