use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use store::{HotelStore, Transaction};

use super::AppState;
use crate::auth::Authenticated;
use crate::error::ApiError;

/// GET /transactions/: the ledger, newest first (staff).
pub async fn list<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(token): Authenticated,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    Ok(Json(state.store.list_transactions(&token).await?))
}
