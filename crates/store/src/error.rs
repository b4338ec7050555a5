use std::collections::BTreeMap;

use domain::BookingError;
use thiserror::Error;

/// Errors returned by a [`HotelStore`](crate::HotelStore).
///
/// The variants mirror the response shapes of the store's HTTP surface, so a
/// remote client and the in-memory store report failures identically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// One or more fields were refused (`{<field>: [..]}`).
    #[error("{}", first_field_message(.0))]
    Fields(BTreeMap<String, Vec<String>>),

    /// A business rule refused the request (`{non_field_errors: [..]}`).
    #[error("{0}")]
    Rejected(String),

    /// The request itself was malformed (`{detail: ..}` at 400).
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// Network failure, server failure or an unreadable response.
    #[error("{0}")]
    Transport(String),
}

impl StoreError {
    /// A single-field refusal.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.into(), vec![message.into()]);
        StoreError::Fields(fields)
    }

    pub fn not_found() -> Self {
        StoreError::NotFound("Not found.".to_string())
    }

    pub fn forbidden() -> Self {
        StoreError::Forbidden("You do not have permission to perform this action.".to_string())
    }

    pub fn unauthenticated() -> Self {
        StoreError::Unauthorized("Authentication credentials were not provided.".to_string())
    }

    /// Converts a local validation failure into the store's refusal shape.
    pub fn from_validation(err: BookingError) -> Self {
        match err {
            BookingError::Field { field, message } => StoreError::field(field, message),
            other => StoreError::BadRequest(other.message().to_string()),
        }
    }
}

fn first_field_message(fields: &BTreeMap<String, Vec<String>>) -> String {
    fields
        .iter()
        .find_map(|(field, messages)| {
            messages
                .first()
                .map(|message| format!("{field}: {message}"))
        })
        .unwrap_or_else(|| "Invalid input.".to_string())
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Fields(fields) => {
                let (field, message) = fields
                    .into_iter()
                    .find_map(|(field, mut messages)| {
                        (!messages.is_empty()).then(|| (field, messages.remove(0)))
                    })
                    .unwrap_or_else(|| ("non_field_errors".to_string(), "Invalid input.".to_string()));
                BookingError::Field { field, message }
            }
            StoreError::Rejected(message) => BookingError::Conflict(message),
            StoreError::BadRequest(message) => BookingError::Validation(message),
            StoreError::NotFound(message) => BookingError::NotFound(message),
            StoreError::Unauthorized(message) => BookingError::Unauthorized(message),
            StoreError::Forbidden(message) => BookingError::Forbidden(message),
            StoreError::Transport(message) => BookingError::Transport(message),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
