//! Customer profile endpoints (staff only).

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::CustomerId;
use domain::{Customer, CustomerDraft, CustomerPatch};
use store::HotelStore;

use super::{AppState, parse_id};
use crate::auth::Authenticated;
use crate::error::ApiError;

/// GET /customers/
pub async fn list<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(token): Authenticated,
) -> Result<Json<Vec<Customer>>, ApiError> {
    Ok(Json(state.store.list_customers(&token).await?))
}

/// POST /customers/
#[tracing::instrument(skip_all)]
pub async fn create<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(token): Authenticated,
    payload: Result<Json<CustomerDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let Json(draft) = payload?;
    let customer = state.store.create_customer(&token, draft).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// PUT /customers/{id}/: every profile field is replaced.
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn replace<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(token): Authenticated,
    Path(id): Path<String>,
    payload: Result<Json<CustomerDraft>, JsonRejection>,
) -> Result<Json<Customer>, ApiError> {
    let id = parse_id(&id, CustomerId::parse)?;
    let Json(draft) = payload?;
    let customer = state
        .store
        .update_customer(&token, id, CustomerPatch::replace_with(draft))
        .await?;
    Ok(Json(customer))
}

/// PATCH /customers/{id}/
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn update<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(token): Authenticated,
    Path(id): Path<String>,
    payload: Result<Json<CustomerPatch>, JsonRejection>,
) -> Result<Json<Customer>, ApiError> {
    let id = parse_id(&id, CustomerId::parse)?;
    let Json(patch) = payload?;
    Ok(Json(state.store.update_customer(&token, id, patch).await?))
}

/// DELETE /customers/{id}/
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn remove<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(token): Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, CustomerId::parse)?;
    state.store.delete_customer(&token, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
