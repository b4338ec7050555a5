//! A [`HotelStore`] that talks HTTP/JSON to the API router.
//!
//! Requests go through the full axum stack (routing, extractors, error
//! encoding) in-process via [`tower::ServiceExt::oneshot`]. Error responses
//! are decoded with [`ErrorBody::decode`], so sessions running over this
//! client see exactly the typed errors they would see against the in-memory
//! store directly.

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use common::{BookingId, CustomerId, RoomId};
use domain::{
    AccessToken, AuthGrant, Booking, BookingRequest, Customer, CustomerDraft, CustomerPatch,
    DateRange, Principal, Registration, Room, RoomDraft, RoomPatch,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use store::{ErrorBody, HotelStore, Result, StoreError, Transaction};
use tower::ServiceExt;

use crate::auth::header_value;

#[derive(Clone)]
pub struct RouterClient {
    router: Router,
}

impl RouterClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&AccessToken>,
        body: Option<Value>,
    ) -> Result<Bytes> {
        let mut builder = Request::builder().method(method.clone()).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, header_value(token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder
            .body(body)
            .map_err(|e| StoreError::Transport(format!("Could not build request: {e}")))?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| StoreError::Transport(format!("Could not read response: {e}")))?;

        if status.is_success() {
            Ok(bytes)
        } else {
            let err = ErrorBody::decode(status.as_u16(), &bytes);
            tracing::debug!(%method, uri, status = status.as_u16(), error = %err, "request refused");
            Err(err)
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        uri: &str,
        token: Option<&AccessToken>,
        body: Option<Value>,
    ) -> Result<T> {
        let bytes = self.send(method, uri, token, body).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Transport(format!("Malformed response from {uri}: {e}")))
    }
}

fn payload(value: &impl Serialize) -> Result<Option<Value>> {
    serde_json::to_value(value)
        .map(Some)
        .map_err(|e| StoreError::Transport(format!("Could not encode request: {e}")))
}

#[async_trait]
impl HotelStore for RouterClient {
    async fn register(&self, registration: Registration) -> Result<AuthGrant> {
        self.fetch(Method::POST, "/auth/register/", None, payload(&registration)?)
            .await
    }

    async fn me(&self, token: &AccessToken) -> Result<Principal> {
        self.fetch(Method::GET, "/auth/me/", Some(token), None).await
    }

    async fn logout(&self, token: &AccessToken) -> Result<()> {
        self.send(Method::POST, "/auth/logout/", Some(token), None)
            .await
            .map(|_| ())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>> {
        self.fetch(Method::GET, "/rooms/", None, None).await
    }

    async fn available_rooms(&self, range: DateRange) -> Result<Vec<Room>> {
        let uri = format!(
            "/rooms/available/?check_in={}&check_out={}",
            range.check_in, range.check_out
        );
        self.fetch(Method::GET, &uri, None, None).await
    }

    async fn create_room(&self, token: &AccessToken, draft: RoomDraft) -> Result<Room> {
        self.fetch(Method::POST, "/rooms/", Some(token), payload(&draft)?)
            .await
    }

    async fn update_room(&self, token: &AccessToken, id: RoomId, patch: RoomPatch) -> Result<Room> {
        let uri = format!("/rooms/{id}/");
        self.fetch(Method::PATCH, &uri, Some(token), payload(&patch)?)
            .await
    }

    async fn delete_room(&self, token: &AccessToken, id: RoomId) -> Result<()> {
        let uri = format!("/rooms/{id}/");
        self.send(Method::DELETE, &uri, Some(token), None)
            .await
            .map(|_| ())
    }

    async fn list_customers(&self, token: &AccessToken) -> Result<Vec<Customer>> {
        self.fetch(Method::GET, "/customers/", Some(token), None).await
    }

    async fn create_customer(&self, token: &AccessToken, draft: CustomerDraft) -> Result<Customer> {
        self.fetch(Method::POST, "/customers/", Some(token), payload(&draft)?)
            .await
    }

    async fn update_customer(
        &self,
        token: &AccessToken,
        id: CustomerId,
        patch: CustomerPatch,
    ) -> Result<Customer> {
        let uri = format!("/customers/{id}/");
        self.fetch(Method::PATCH, &uri, Some(token), payload(&patch)?)
            .await
    }

    async fn delete_customer(&self, token: &AccessToken, id: CustomerId) -> Result<()> {
        let uri = format!("/customers/{id}/");
        self.send(Method::DELETE, &uri, Some(token), None)
            .await
            .map(|_| ())
    }

    async fn list_bookings(&self, token: &AccessToken) -> Result<Vec<Booking>> {
        self.fetch(Method::GET, "/bookings/", Some(token), None).await
    }

    async fn create_booking(&self, token: &AccessToken, request: BookingRequest) -> Result<Booking> {
        self.fetch(Method::POST, "/bookings/", Some(token), payload(&request)?)
            .await
    }

    async fn cancel_booking(&self, token: &AccessToken, id: BookingId) -> Result<()> {
        let uri = format!("/bookings/{id}/");
        self.send(Method::DELETE, &uri, Some(token), None)
            .await
            .map(|_| ())
    }

    async fn list_transactions(&self, token: &AccessToken) -> Result<Vec<Transaction>> {
        self.fetch(Method::GET, "/transactions/", Some(token), None).await
    }
}
