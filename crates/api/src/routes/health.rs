//! Liveness endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use store::HotelStore;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rooms: usize,
}

/// GET /health: reports `ok` and the inventory size, or `degraded` if the
/// store cannot list rooms.
pub async fn check<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<HealthResponse> {
    match state.store.list_rooms().await {
        Ok(rooms) => Json(HealthResponse {
            status: "ok",
            rooms: rooms.len(),
        }),
        Err(err) => {
            tracing::warn!(error = %err, "health check could not reach the store");
            Json(HealthResponse {
                status: "degraded",
                rooms: 0,
            })
        }
    }
}
