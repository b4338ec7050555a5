//! Route handlers, one module per resource.

pub mod auth;
pub mod bookings;
pub mod customers;
pub mod health;
pub mod metrics;
pub mod rooms;
pub mod transactions;

use crate::error::ApiError;
use store::StoreError;

/// Shared state for every store-backed handler.
pub struct AppState<S> {
    pub store: S,
}

/// Parses an identifier from a path segment. A malformed id names no
/// resource, so it is reported as not found.
pub(crate) fn parse_id<T>(
    raw: &str,
    parse: fn(&str) -> Result<T, uuid::Error>,
) -> Result<T, ApiError> {
    parse(raw).map_err(|_| StoreError::not_found().into())
}
