use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use common::{BookingId, CustomerId, RoomId};
use domain::{
    AccessToken, AuthGrant, AvailabilityResolver, Booking, BookingRequest, BookingStatus, Clock,
    Customer, CustomerDraft, CustomerPatch, DateRange, PaymentDetails, PaymentReferenceGenerator,
    Principal, Registration, Room, RoomDraft, RoomPatch, SystemClock,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::ledger::Ledger;
use crate::{HotelStore, Result, StoreError, Transaction};

const ALREADY_BOOKED: &str = "Room is already booked for the selected date range.";
const NOT_CANCELLABLE: &str = "Booking not found or already cancelled.";
const REQUIRED: &str = "This field is required.";

#[derive(Debug, Clone)]
struct CustomerRecord {
    username: Option<String>,
    profile: CustomerDraft,
}

#[derive(Debug, Default)]
struct StoreState {
    rooms: HashMap<RoomId, Room>,
    customers: HashMap<CustomerId, CustomerRecord>,
    /// Insertion order.
    bookings: Vec<Booking>,
    /// Username to identity.
    accounts: HashMap<String, Principal>,
    /// Token to username.
    tokens: HashMap<String, String>,
    ledger: Ledger,
}

impl StoreState {
    fn principal(&self, token: &AccessToken) -> Result<Principal> {
        self.tokens
            .get(token.as_str())
            .and_then(|username| self.accounts.get(username))
            .cloned()
            .ok_or_else(|| StoreError::Unauthorized("Invalid token.".to_string()))
    }

    fn staff(&self, token: &AccessToken) -> Result<Principal> {
        let principal = self.principal(token)?;
        if !principal.is_staff() {
            return Err(StoreError::forbidden());
        }
        Ok(principal)
    }

    fn issue_token(&mut self, principal: Principal) -> AuthGrant {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), principal.username.clone());
        self.accounts
            .insert(principal.username.clone(), principal.clone());
        AuthGrant {
            token: AccessToken::new(token),
            principal,
        }
    }

    /// The room with its `is_available` flag derived from current bookings.
    fn room_view(&self, room: &Room, today: NaiveDate) -> Room {
        let mut room = room.clone();
        room.is_available = !self
            .bookings
            .iter()
            .any(|b| b.is_active() && b.room == room.id && b.stay.ends_after(today));
        room
    }

    fn rooms_by_number(&self, today: NaiveDate) -> Vec<Room> {
        let mut rooms: Vec<Room> = self
            .rooms
            .values()
            .map(|room| self.room_view(room, today))
            .collect();
        rooms.sort_by(|a, b| a.room_number.cmp(&b.room_number));
        rooms
    }

    fn customer_view(&self, id: CustomerId, record: &CustomerRecord) -> Customer {
        let bookings: Vec<&Booking> = self.bookings.iter().filter(|b| b.customer == id).collect();
        Customer::with_history(id, record.username.clone(), record.profile.clone(), &bookings)
    }

    fn ensure_unique_room_number(&self, number: &str, except: Option<RoomId>) -> Result<()> {
        let taken = self
            .rooms
            .values()
            .any(|room| room.room_number == number && Some(room.id) != except);
        if taken {
            return Err(StoreError::field(
                "room_number",
                "room with this room number already exists.",
            ));
        }
        Ok(())
    }

    fn ensure_unique_national_id(&self, national_id: &str, except: Option<CustomerId>) -> Result<()> {
        let taken = self
            .customers
            .iter()
            .any(|(id, record)| record.profile.national_id == national_id && Some(*id) != except);
        if taken {
            return Err(StoreError::field(
                "national_id",
                "Customer with this national id already exists.",
            ));
        }
        Ok(())
    }

    fn insert_customer(&mut self, username: Option<String>, profile: CustomerDraft) -> CustomerId {
        let id = CustomerId::new();
        self.customers.insert(id, CustomerRecord { username, profile });
        id
    }

    /// Bookings newest first, keeping later insertions ahead on equal timestamps.
    fn bookings_newest_first(&self, include: impl Fn(&Booking) -> bool) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .rev()
            .filter(|b| include(*b))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bookings
    }
}

/// In-memory authoritative store.
///
/// Every mutation runs under a single write lock, which makes booking
/// creation one check-and-insert: two overlapping submissions for the same
/// room are serialized and the second sees the first.
#[derive(Clone)]
pub struct InMemoryHotelStore {
    state: Arc<RwLock<StoreState>>,
    clock: Arc<dyn Clock>,
    references: PaymentReferenceGenerator,
}

impl Default for InMemoryHotelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHotelStore {
    /// Creates an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates an empty store reading "today" and payment stamps from `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            clock: Arc::new(clock),
            references: PaymentReferenceGenerator::new(),
        }
    }

    /// Issues a token for a staff account, creating the account if needed.
    pub async fn issue_staff_token(&self, username: &str) -> AuthGrant {
        let mut state = self.state.write().await;
        tracing::info!(%username, "staff token issued");
        state.issue_token(Principal::staff(username))
    }

    /// Adds a room without an authenticated caller. Used for seeding.
    pub async fn seed_room(&self, draft: RoomDraft) -> Result<Room> {
        let mut state = self.state.write().await;
        insert_room(&mut state, draft)
    }

    /// Returns the total number of bookings held, cancelled ones included.
    pub async fn booking_count(&self) -> usize {
        self.state.read().await.bookings.len()
    }
}

fn insert_room(state: &mut StoreState, draft: RoomDraft) -> Result<Room> {
    draft.validate().map_err(StoreError::from_validation)?;
    state.ensure_unique_room_number(&draft.room_number, None)?;
    let room = Room {
        id: RoomId::new(),
        room_number: draft.room_number,
        room_type: draft.room_type,
        price: draft.price,
        is_available: true,
    };
    state.rooms.insert(room.id, room.clone());
    tracing::info!(room_id = %room.id, room_number = %room.room_number, "room created");
    Ok(room)
}

fn reject(reason: &'static str, err: StoreError) -> StoreError {
    metrics::counter!("bookings_rejected_total", "reason" => reason).increment(1);
    tracing::warn!(reason, error = %err, "booking rejected");
    err
}

#[async_trait]
impl HotelStore for InMemoryHotelStore {
    #[tracing::instrument(skip(self, registration), fields(username = %registration.username))]
    async fn register(&self, registration: Registration) -> Result<AuthGrant> {
        let username = registration.username.trim().to_string();
        if username.is_empty() {
            return Err(StoreError::field("username", "This field may not be blank."));
        }
        let profile = CustomerDraft::new(
            registration.name,
            registration.phone,
            registration.national_id,
        );
        profile.validate().map_err(StoreError::from_validation)?;

        let mut state = self.state.write().await;
        if state.accounts.contains_key(&username) {
            return Err(StoreError::field(
                "username",
                "A user with that username already exists.",
            ));
        }
        state.ensure_unique_national_id(&profile.national_id, None)?;

        let customer_id = state.insert_customer(Some(username.clone()), profile);
        tracing::info!(%customer_id, "customer registered");
        Ok(state.issue_token(Principal::customer(username, customer_id)))
    }

    async fn me(&self, token: &AccessToken) -> Result<Principal> {
        self.state.read().await.principal(token)
    }

    async fn logout(&self, token: &AccessToken) -> Result<()> {
        let mut state = self.state.write().await;
        let principal = state.principal(token)?;
        state.tokens.remove(token.as_str());
        tracing::info!(username = %principal.username, "token revoked");
        Ok(())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>> {
        let today = self.clock.today();
        Ok(self.state.read().await.rooms_by_number(today))
    }

    #[tracing::instrument(skip(self), fields(range = %range))]
    async fn available_rooms(&self, range: DateRange) -> Result<Vec<Room>> {
        let today = self.clock.today();
        let state = self.state.read().await;
        let started = Instant::now();
        let inventory = state.rooms_by_number(today);
        let free = AvailabilityResolver::resolve(&inventory, &state.bookings, &range)
            .map_err(|e| StoreError::BadRequest(e.to_string()))?;
        metrics::histogram!("availability_resolve_seconds").record(started.elapsed().as_secs_f64());
        metrics::counter!("availability_queries_total").increment(1);
        tracing::debug!(free = free.len(), total = inventory.len(), "availability resolved");
        Ok(free)
    }

    async fn create_room(&self, token: &AccessToken, draft: RoomDraft) -> Result<Room> {
        let mut state = self.state.write().await;
        state.staff(token)?;
        insert_room(&mut state, draft)
    }

    async fn update_room(&self, token: &AccessToken, id: RoomId, patch: RoomPatch) -> Result<Room> {
        let today = self.clock.today();
        let mut state = self.state.write().await;
        state.staff(token)?;
        if !state.rooms.contains_key(&id) {
            return Err(StoreError::not_found());
        }
        patch.validate().map_err(StoreError::from_validation)?;
        if let Some(number) = &patch.room_number {
            state.ensure_unique_room_number(number, Some(id))?;
        }

        let room = state.rooms.get_mut(&id).ok_or_else(StoreError::not_found)?;
        patch.apply(room);
        let room = room.clone();
        tracing::info!(room_id = %id, "room updated");
        Ok(state.room_view(&room, today))
    }

    async fn delete_room(&self, token: &AccessToken, id: RoomId) -> Result<()> {
        let mut state = self.state.write().await;
        state.staff(token)?;
        state.rooms.remove(&id).ok_or_else(StoreError::not_found)?;
        let before = state.bookings.len();
        state.bookings.retain(|b| b.room != id);
        tracing::info!(room_id = %id, bookings_removed = before - state.bookings.len(), "room deleted");
        Ok(())
    }

    async fn list_customers(&self, token: &AccessToken) -> Result<Vec<Customer>> {
        let state = self.state.read().await;
        state.staff(token)?;
        let mut customers: Vec<Customer> = state
            .customers
            .iter()
            .map(|(id, record)| state.customer_view(*id, record))
            .collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn create_customer(&self, token: &AccessToken, draft: CustomerDraft) -> Result<Customer> {
        let mut state = self.state.write().await;
        state.staff(token)?;
        draft.validate().map_err(StoreError::from_validation)?;
        state.ensure_unique_national_id(&draft.national_id, None)?;

        let id = state.insert_customer(None, draft.clone());
        tracing::info!(customer_id = %id, "customer created");
        Ok(state.customer_view(id, &CustomerRecord { username: None, profile: draft }))
    }

    async fn update_customer(
        &self,
        token: &AccessToken,
        id: CustomerId,
        patch: CustomerPatch,
    ) -> Result<Customer> {
        let mut state = self.state.write().await;
        state.staff(token)?;
        if !state.customers.contains_key(&id) {
            return Err(StoreError::not_found());
        }
        patch.validate().map_err(StoreError::from_validation)?;
        if let Some(national_id) = &patch.national_id {
            state.ensure_unique_national_id(national_id, Some(id))?;
        }

        let record = state.customers.get_mut(&id).ok_or_else(StoreError::not_found)?;
        patch.apply(&mut record.profile);
        let record = record.clone();
        tracing::info!(customer_id = %id, "customer updated");
        Ok(state.customer_view(id, &record))
    }

    async fn delete_customer(&self, token: &AccessToken, id: CustomerId) -> Result<()> {
        let mut state = self.state.write().await;
        state.staff(token)?;
        state.customers.remove(&id).ok_or_else(StoreError::not_found)?;
        state.bookings.retain(|b| b.customer != id);
        for principal in state.accounts.values_mut() {
            if principal.customer_id == Some(id) {
                principal.customer_id = None;
            }
        }
        tracing::info!(customer_id = %id, "customer deleted");
        Ok(())
    }

    async fn list_bookings(&self, token: &AccessToken) -> Result<Vec<Booking>> {
        let state = self.state.read().await;
        let principal = state.principal(token)?;
        if principal.is_staff() {
            return Ok(state.bookings_newest_first(|_| true));
        }
        Ok(match principal.customer_id {
            Some(customer) => state.bookings_newest_first(|b| b.customer == customer),
            None => Vec::new(),
        })
    }

    #[tracing::instrument(skip(self, token), fields(room = %request.room, stay = %request.stay))]
    async fn create_booking(&self, token: &AccessToken, request: BookingRequest) -> Result<Booking> {
        let now = self.clock.now();
        let mut state = self.state.write().await;
        let principal = state.principal(token)?;

        let customer_id = if principal.is_staff() {
            request
                .customer
                .ok_or_else(|| reject("invalid", StoreError::field("customer", REQUIRED)))?
        } else {
            principal.customer_id.ok_or_else(|| {
                reject(
                    "no_profile",
                    StoreError::Rejected("Customer profile not found.".to_string()),
                )
            })?
        };
        let room = state.rooms.get(&request.room).cloned().ok_or_else(|| {
            reject(
                "invalid",
                StoreError::field(
                    "room",
                    format!("Invalid pk \"{}\" - object does not exist.", request.room),
                ),
            )
        })?;
        let customer_name = state
            .customers
            .get(&customer_id)
            .map(|record| record.profile.name.clone())
            .ok_or_else(|| {
                reject(
                    "invalid",
                    StoreError::field(
                        "customer",
                        format!("Invalid pk \"{customer_id}\" - object does not exist."),
                    ),
                )
            })?;
        request
            .stay
            .validate()
            .map_err(|e| reject("invalid", StoreError::field("check_out", e.to_string())))?;

        let reference = request.payment_reference.filter(|r| !r.is_blank());
        let method = request
            .payment_method
            .or_else(|| reference.as_ref().and_then(|r| r.method()));
        let payment = match method {
            Some(method) => Some(PaymentDetails {
                method,
                reference: reference.unwrap_or_else(|| self.references.generate(method, now)),
            }),
            None if principal.is_staff() => None,
            None => return Err(reject("invalid", StoreError::field("payment_method", REQUIRED))),
        };

        let amount = room.checked_quote(request.stay.nights()).ok_or_else(|| {
            reject(
                "invalid",
                StoreError::field("price", "Booking total is out of range."),
            )
        })?;

        if !AvailabilityResolver::is_free(room.id, &state.bookings, &request.stay) {
            return Err(reject(
                "overlap",
                StoreError::Rejected(ALREADY_BOOKED.to_string()),
            ));
        }

        let booking = Booking {
            id: BookingId::new(),
            room: room.id,
            room_number: room.room_number.clone(),
            customer: customer_id,
            customer_name,
            stay: request.stay,
            created_at: Utc::now(),
            status: BookingStatus::Active,
            payment,
        };
        state.bookings.push(booking.clone());
        state.ledger.record_booking(&booking, &room, amount);

        metrics::counter!("bookings_created_total").increment(1);
        tracing::info!(booking_id = %booking.id, customer_id = %customer_id, "booking created");
        Ok(booking)
    }

    #[tracing::instrument(skip(self, token))]
    async fn cancel_booking(&self, token: &AccessToken, id: BookingId) -> Result<()> {
        let mut state = self.state.write().await;
        let principal = state.principal(token)?;

        let index = state
            .bookings
            .iter()
            .position(|b| {
                b.id == id
                    && b.is_active()
                    && (principal.is_staff() || principal.customer_id == Some(b.customer))
            })
            .ok_or_else(|| StoreError::NotFound(NOT_CANCELLABLE.to_string()))?;

        state.bookings[index].status = BookingStatus::Cancelled;
        let booking = state.bookings[index].clone();
        if let Some(room) = state.rooms.get(&booking.room).cloned() {
            state.ledger.record_cancellation(&booking, &room);
        }

        metrics::counter!("bookings_cancelled_total").increment(1);
        tracing::info!(booking_id = %id, "booking cancelled");
        Ok(())
    }

    async fn list_transactions(&self, token: &AccessToken) -> Result<Vec<Transaction>> {
        let state = self.state.read().await;
        state.staff(token)?;
        Ok(state.ledger.newest_first())
    }
}
