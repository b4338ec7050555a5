//! Room inventory and availability endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::RoomId;
use domain::{DateRange, DateRangeError, Room, RoomDraft, RoomPatch};
use serde::Deserialize;
use store::HotelStore;

use super::{AppState, parse_id};
use crate::auth::Authenticated;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

impl AvailabilityQuery {
    fn range(&self) -> Result<DateRange, ApiError> {
        let (Some(check_in), Some(check_out)) = (
            self.check_in.as_deref().filter(|v| !v.is_empty()),
            self.check_out.as_deref().filter(|v| !v.is_empty()),
        ) else {
            return Err(ApiError::Query(
                "check_in and check_out query params are required (YYYY-MM-DD).".to_string(),
            ));
        };
        DateRange::parse(check_in, check_out).map_err(|err| {
            ApiError::Query(match err {
                DateRangeError::Unparseable { .. } => "Invalid date format. Use YYYY-MM-DD.".to_string(),
                DateRangeError::NotIncreasing { .. } => {
                    "check_out must be later than check_in.".to_string()
                }
                other => other.to_string(),
            })
        })
    }
}

/// GET /rooms/
pub async fn list<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Room>>, ApiError> {
    Ok(Json(state.store.list_rooms().await?))
}

/// GET /rooms/available/?check_in=..&check_out=..
#[tracing::instrument(skip_all)]
pub async fn available<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Result<Json<Vec<Room>>, ApiError> {
    let Query(query) = query?;
    let range = query.range()?;
    Ok(Json(state.store.available_rooms(range).await?))
}

/// POST /rooms/ (staff)
#[tracing::instrument(skip_all)]
pub async fn create<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(token): Authenticated,
    payload: Result<Json<RoomDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    let Json(draft) = payload?;
    let room = state.store.create_room(&token, draft).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// PATCH /rooms/{id}/ (staff)
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn update<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(token): Authenticated,
    Path(id): Path<String>,
    payload: Result<Json<RoomPatch>, JsonRejection>,
) -> Result<Json<Room>, ApiError> {
    let id = parse_id(&id, RoomId::parse)?;
    let Json(patch) = payload?;
    Ok(Json(state.store.update_room(&token, id, patch).await?))
}

/// DELETE /rooms/{id}/ (staff)
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn remove<S: HotelStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(token): Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, RoomId::parse)?;
    state.store.delete_room(&token, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(check_in: Option<&str>, check_out: Option<&str>) -> AvailabilityQuery {
        AvailabilityQuery {
            check_in: check_in.map(str::to_string),
            check_out: check_out.map(str::to_string),
        }
    }

    fn message(err: ApiError) -> String {
        match err {
            ApiError::Query(message) => message,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_dates() {
        let err = query(Some("2025-01-01"), None).range().unwrap_err();
        assert!(message(err).starts_with("check_in and check_out"));
        let err = query(Some(""), Some("2025-01-02")).range().unwrap_err();
        assert!(message(err).starts_with("check_in and check_out"));
    }

    #[test]
    fn test_bad_and_reversed_dates() {
        let err = query(Some("01/01/2025"), Some("2025-01-02")).range().unwrap_err();
        assert_eq!(message(err), "Invalid date format. Use YYYY-MM-DD.");
        let err = query(Some("2025-01-02"), Some("2025-01-02")).range().unwrap_err();
        assert_eq!(message(err), "check_out must be later than check_in.");
    }

    #[test]
    fn test_valid_range() {
        let range = query(Some("2025-01-01"), Some("2025-01-03")).range().unwrap();
        assert_eq!(range.nights(), 2);
    }
}
