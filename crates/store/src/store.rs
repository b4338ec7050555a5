use async_trait::async_trait;
use common::{BookingId, CustomerId, RoomId};
use domain::{
    AccessToken, AuthGrant, Booking, BookingRequest, Customer, CustomerDraft, CustomerPatch,
    DateRange, Principal, Registration, Room, RoomDraft, RoomPatch,
};

use crate::{Result, Transaction};

/// The authoritative store for rooms, customers and bookings.
///
/// Implementations must perform booking creation as one atomic
/// check-and-insert per room: two concurrent submissions for overlapping
/// stays on the same room never both succeed. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait HotelStore: Send + Sync {
    /// Creates a customer bound to a new username and signs it in.
    async fn register(&self, registration: Registration) -> Result<AuthGrant>;

    /// Who the token belongs to.
    async fn me(&self, token: &AccessToken) -> Result<Principal>;

    /// Revokes the token.
    async fn logout(&self, token: &AccessToken) -> Result<()>;

    /// All rooms, ordered by room number. Public.
    async fn list_rooms(&self) -> Result<Vec<Room>>;

    /// Rooms with no active booking overlapping `range`. Public.
    async fn available_rooms(&self, range: DateRange) -> Result<Vec<Room>>;

    async fn create_room(&self, token: &AccessToken, draft: RoomDraft) -> Result<Room>;

    async fn update_room(&self, token: &AccessToken, id: RoomId, patch: RoomPatch)
    -> Result<Room>;

    /// Deletes the room and every booking held on it.
    async fn delete_room(&self, token: &AccessToken, id: RoomId) -> Result<()>;

    /// All customers with their booking history, ordered by name. Staff only.
    async fn list_customers(&self, token: &AccessToken) -> Result<Vec<Customer>>;

    async fn create_customer(&self, token: &AccessToken, draft: CustomerDraft)
    -> Result<Customer>;

    async fn update_customer(
        &self,
        token: &AccessToken,
        id: CustomerId,
        patch: CustomerPatch,
    ) -> Result<Customer>;

    /// Deletes the customer and their bookings.
    async fn delete_customer(&self, token: &AccessToken, id: CustomerId) -> Result<()>;

    /// Bookings newest first: all of them for staff, the caller's own for customers.
    async fn list_bookings(&self, token: &AccessToken) -> Result<Vec<Booking>>;

    /// Creates a booking, refusing it if the room is held for any night of the stay.
    async fn create_booking(&self, token: &AccessToken, request: BookingRequest)
    -> Result<Booking>;

    /// Cancels an active booking the caller may act on.
    async fn cancel_booking(&self, token: &AccessToken, id: BookingId) -> Result<()>;

    /// Ledger entries newest first. Staff only.
    async fn list_transactions(&self, token: &AccessToken) -> Result<Vec<Transaction>>;
}
