//! HTTP API server with observability for the hotel booking engine.
//!
//! Exposes the authoritative store over REST/JSON, with structured logging
//! (tracing) and Prometheus metrics. [`RouterClient`] consumes the same
//! routes as a [`store::HotelStore`].

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use domain::{Money, Room, RoomDraft};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{HotelStore, InMemoryHotelStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use client::RouterClient;
use routes::AppState;

/// Routes backed by the store: rooms, customers, bookings, auth and the
/// transaction ledger.
pub fn store_router<S: HotelStore + 'static>(store: S) -> Router {
    let state = Arc::new(AppState { store });

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route("/auth/register/", post(routes::auth::register::<S>))
        .route("/auth/me/", get(routes::auth::me::<S>))
        .route("/auth/logout/", post(routes::auth::logout::<S>))
        .route(
            "/rooms/",
            get(routes::rooms::list::<S>).post(routes::rooms::create::<S>),
        )
        .route("/rooms/available/", get(routes::rooms::available::<S>))
        .route(
            "/rooms/{id}/",
            patch(routes::rooms::update::<S>).delete(routes::rooms::remove::<S>),
        )
        .route(
            "/customers/",
            get(routes::customers::list::<S>).post(routes::customers::create::<S>),
        )
        .route(
            "/customers/{id}/",
            patch(routes::customers::update::<S>)
                .put(routes::customers::replace::<S>)
                .delete(routes::customers::remove::<S>),
        )
        .route(
            "/bookings/",
            get(routes::bookings::list::<S>).post(routes::bookings::create::<S>),
        )
        .route("/bookings/{id}/", delete(routes::bookings::cancel::<S>))
        .route("/transactions/", get(routes::transactions::list::<S>))
        .with_state(state)
}

/// Creates the full application: store routes, `/metrics`, CORS and request
/// tracing.
pub fn create_app<S: HotelStore + 'static>(store: S, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    store_router(store)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Seeds a small demo inventory, skipping room numbers that already exist.
pub async fn seed_demo_rooms(store: &InMemoryHotelStore) -> store::Result<Vec<Room>> {
    let existing: Vec<String> = store
        .list_rooms()
        .await?
        .into_iter()
        .map(|room| room.room_number)
        .collect();

    let mut seeded = Vec::new();
    for (number, room_type, price) in [
        ("101", "single", 45),
        ("102", "single", 45),
        ("201", "double", 80),
        ("202", "double", 80),
        ("301", "suite", 150),
    ] {
        if existing.iter().any(|n| n == number) {
            continue;
        }
        let room = store
            .seed_room(RoomDraft::new(number, room_type, Money::from_units(price)))
            .await?;
        seeded.push(room);
    }
    tracing::info!(count = seeded.len(), "demo rooms seeded");
    Ok(seeded)
}
