//! Registration, identity and sign-out.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use domain::{AuthGrant, Principal, Registration};
use store::HotelStore;

use super::AppState;
use crate::auth::Authenticated;
use crate::error::ApiError;

/// POST /auth/register/: creates a customer bound to a new username.
#[tracing::instrument(skip_all)]
pub async fn register<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthGrant>), ApiError> {
    let Json(registration) = payload?;
    let grant = state.store.register(registration).await?;
    Ok((StatusCode::CREATED, Json(grant)))
}

/// GET /auth/me/
pub async fn me<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(token): Authenticated,
) -> Result<Json<Principal>, ApiError> {
    Ok(Json(state.store.me(&token).await?))
}

/// POST /auth/logout/: revokes the caller's token.
pub async fn logout<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(token): Authenticated,
) -> Result<StatusCode, ApiError> {
    state.store.logout(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}
