//! Booking endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::BookingId;
use domain::{Booking, BookingRequest};
use store::HotelStore;

use super::{AppState, parse_id};
use crate::auth::Authenticated;
use crate::error::ApiError;

/// GET /bookings/: all bookings for staff, the caller's own for customers.
pub async fn list<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(token): Authenticated,
) -> Result<Json<Vec<Booking>>, ApiError> {
    Ok(Json(state.store.list_bookings(&token).await?))
}

/// POST /bookings/
///
/// An overlapping stay is refused with `{"non_field_errors": [..]}`; field
/// problems come back as `{"<field>": [..]}`.
#[tracing::instrument(skip_all)]
pub async fn create<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(token): Authenticated,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let Json(request) = payload?;
    let booking = state.store.create_booking(&token, request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// DELETE /bookings/{id}/: cancels the booking; the record is kept.
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn cancel<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(token): Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, BookingId::parse)?;
    state.store.cancel_booking(&token, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
