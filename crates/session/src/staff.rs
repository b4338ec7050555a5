//! Staff console: inventory, customers and bookings on behalf of customers.

use common::{BookingId, CustomerId, RoomId};
use domain::{
    AuthSession, Booking, BookingError, BookingLifecycle, Clock, Customer, CustomerDraft,
    CustomerPatch, DateRange, Principal, Room, RoomDraft, RoomPatch, SubmissionOutcome,
};
use store::{HotelStore, Transaction};

use crate::availability::{AvailabilityFetch, AvailabilityTicket, AvailabilityView};
use crate::observe_auth;

/// A staff member's view of the hotel.
///
/// Each mutation accepted by the store is followed by a re-fetch of the lists
/// it can affect and a fresh availability resolution for the console's stay.
pub struct StaffConsole<S> {
    store: S,
    auth: AuthSession,
    principal: Principal,
    stay: DateRange,
    rooms: Vec<Room>,
    customers: Vec<Customer>,
    bookings: Vec<Booking>,
    availability: AvailabilityView,
    notice: Option<String>,
}

/// Which lists a mutation invalidates.
#[derive(Debug, Clone, Copy, Default)]
struct Stale {
    rooms: bool,
    customers: bool,
    bookings: bool,
}

impl<S> StaffConsole<S>
where
    S: HotelStore + Clone,
{
    /// Loads every list in parallel. Fails with `Forbidden` for non-staff callers.
    #[tracing::instrument(skip_all)]
    pub async fn load(store: S, auth: &mut AuthSession, clock: &impl Clock) -> Result<Self, BookingError> {
        let token = auth.require_token()?.clone();
        let principal = observe_auth(auth, store.me(&token).await.map_err(BookingError::from))?;
        if !principal.is_staff() {
            return Err(BookingError::Forbidden("Staff access required.".to_string()));
        }

        let stay = DateRange::from_offset(clock.today(), 1)?;
        let mut availability = AvailabilityView::new();
        let ticket = availability.request(stay);
        let (rooms, customers, bookings, free) = tokio::join!(
            store.list_rooms(),
            store.list_customers(&token),
            store.list_bookings(&token),
            store.available_rooms(stay),
        );
        let customers = observe_auth(auth, customers.map_err(BookingError::from))?;
        let bookings = observe_auth(auth, bookings.map_err(BookingError::from))?;
        availability.apply(ticket, free.map_err(BookingError::from)?);

        tracing::info!(username = %principal.username, "staff console loaded");
        Ok(Self {
            store,
            auth: std::mem::take(auth),
            principal,
            stay,
            rooms: rooms.map_err(BookingError::from)?,
            customers,
            bookings,
            availability,
            notice: None,
        })
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn stay(&self) -> DateRange {
        self.stay
    }

    pub fn available_rooms(&self) -> &[Room] {
        self.availability.rooms()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Changes the stay availability is resolved for.
    pub fn set_stay(&mut self, stay: DateRange) -> Result<AvailabilityFetch<S>, BookingError> {
        stay.validate()?;
        self.stay = stay;
        let ticket = self.availability.request(stay);
        Ok(AvailabilityFetch::new(self.store.clone(), ticket))
    }

    /// Applies a completed availability request; stale results are ignored.
    pub fn apply_availability(
        &mut self,
        ticket: AvailabilityTicket,
        result: Result<Vec<Room>, BookingError>,
    ) -> Result<bool, BookingError> {
        if !self.availability.is_latest(&ticket) {
            return Ok(self.availability.apply(ticket, Vec::new()));
        }
        let rooms = observe_auth(&mut self.auth, result)?;
        Ok(self.availability.apply(ticket, rooms))
    }

    pub async fn create_room(&mut self, draft: RoomDraft) -> Result<Room, BookingError> {
        draft.validate()?;
        let token = self.auth.require_token()?.clone();
        let room = self.store.create_room(&token, draft).await.map_err(BookingError::from);
        let room = observe_auth(&mut self.auth, room)?;
        self.after_mutation("Room created.", Stale { rooms: true, ..Stale::default() })
            .await;
        Ok(room)
    }

    pub async fn update_room(&mut self, id: RoomId, patch: RoomPatch) -> Result<Room, BookingError> {
        patch.validate()?;
        let token = self.auth.require_token()?.clone();
        let room = self.store.update_room(&token, id, patch).await.map_err(BookingError::from);
        let room = observe_auth(&mut self.auth, room)?;
        self.after_mutation(
            "Room updated.",
            Stale {
                rooms: true,
                bookings: true,
                ..Stale::default()
            },
        )
        .await;
        Ok(room)
    }

    /// Deletes a room; its bookings go with it.
    pub async fn delete_room(&mut self, id: RoomId) -> Result<(), BookingError> {
        let token = self.auth.require_token()?.clone();
        let result = self.store.delete_room(&token, id).await.map_err(BookingError::from);
        observe_auth(&mut self.auth, result)?;
        self.after_mutation(
            "Room deleted.",
            Stale {
                rooms: true,
                customers: true,
                bookings: true,
            },
        )
        .await;
        Ok(())
    }

    pub async fn create_customer(&mut self, draft: CustomerDraft) -> Result<Customer, BookingError> {
        draft.validate()?;
        let token = self.auth.require_token()?.clone();
        let customer = self
            .store
            .create_customer(&token, draft)
            .await
            .map_err(BookingError::from);
        let customer = observe_auth(&mut self.auth, customer)?;
        self.after_mutation(
            "Customer created.",
            Stale {
                customers: true,
                ..Stale::default()
            },
        )
        .await;
        Ok(customer)
    }

    pub async fn update_customer(
        &mut self,
        id: CustomerId,
        patch: CustomerPatch,
    ) -> Result<Customer, BookingError> {
        patch.validate()?;
        let token = self.auth.require_token()?.clone();
        let customer = self
            .store
            .update_customer(&token, id, patch)
            .await
            .map_err(BookingError::from);
        let customer = observe_auth(&mut self.auth, customer)?;
        self.after_mutation(
            "Customer updated.",
            Stale {
                customers: true,
                bookings: true,
                ..Stale::default()
            },
        )
        .await;
        Ok(customer)
    }

    /// Deletes a customer; their bookings go with them.
    pub async fn delete_customer(&mut self, id: CustomerId) -> Result<(), BookingError> {
        let token = self.auth.require_token()?.clone();
        let result = self.store.delete_customer(&token, id).await.map_err(BookingError::from);
        observe_auth(&mut self.auth, result)?;
        self.after_mutation(
            "Customer deleted.",
            Stale {
                rooms: true,
                customers: true,
                bookings: true,
            },
        )
        .await;
        Ok(())
    }

    /// Books `room` for `customer`. No payment step is involved.
    #[tracing::instrument(skip(self))]
    pub async fn book_for_customer(
        &mut self,
        customer: CustomerId,
        room: RoomId,
        stay: DateRange,
    ) -> Result<Booking, BookingError> {
        let mut lifecycle = BookingLifecycle::draft(stay);
        lifecycle.select_room(Some(room))?;
        let request = lifecycle.submit_on_behalf_of(customer)?;

        let token = self.auth.require_token()?.clone();
        let response = self
            .store
            .create_booking(&token, request)
            .await
            .map_err(BookingError::from);

        match lifecycle.record_outcome(response)? {
            SubmissionOutcome::Booked(booking) => {
                self.after_mutation(
                    "Booking created.",
                    Stale {
                        rooms: true,
                        customers: true,
                        bookings: true,
                    },
                )
                .await;
                Ok(booking)
            }
            SubmissionOutcome::Conflict(err) => {
                self.notice = Some(err.message().to_string());
                self.refresh_quietly(Stale {
                    bookings: true,
                    ..Stale::default()
                })
                .await;
                Err(err)
            }
            SubmissionOutcome::FieldRejected(err) | SubmissionOutcome::RetryAllowed(err) => {
                self.notice = Some(err.message().to_string());
                Err(err)
            }
            SubmissionOutcome::Refused(err) => observe_auth(&mut self.auth, Err(err)),
        }
    }

    /// Cancels any active booking.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_booking(&mut self, id: BookingId) -> Result<(), BookingError> {
        let booking = self
            .bookings
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| BookingError::NotFound("Booking not found or not cancellable.".to_string()))?;
        let mut lifecycle = BookingLifecycle::from_booking(booking);
        lifecycle.request_cancellation(&self.principal)?;

        let token = self.auth.require_token()?.clone();
        let response = self.store.cancel_booking(&token, id).await.map_err(BookingError::from);
        let response = observe_auth(&mut self.auth, response);
        lifecycle.record_cancellation(response)?;

        self.after_mutation(
            "Booking cancelled successfully.",
            Stale {
                rooms: true,
                customers: true,
                bookings: true,
            },
        )
        .await;
        Ok(())
    }

    /// The transaction ledger, newest first.
    pub async fn transactions(&mut self) -> Result<Vec<Transaction>, BookingError> {
        let token = self.auth.require_token()?.clone();
        let result = self.store.list_transactions(&token).await.map_err(BookingError::from);
        observe_auth(&mut self.auth, result)
    }

    async fn after_mutation(&mut self, message: &str, stale: Stale) {
        self.notice = Some(message.to_string());
        self.refresh_quietly(stale).await;
    }

    /// Re-fetches the stale lists and re-resolves availability. Failures are
    /// logged; the mutation itself already succeeded.
    async fn refresh_quietly(&mut self, stale: Stale) {
        if let Err(err) = self.refresh(stale).await {
            tracing::warn!(error = %err, "refresh after mutation failed");
        }
    }

    /// Re-fetches the given lists and availability in parallel.
    async fn refresh(&mut self, stale: Stale) -> Result<(), BookingError> {
        let token = self.auth.require_token()?.clone();
        let ticket = self.availability.request(self.stay);
        let fetch = AvailabilityFetch::new(self.store.clone(), ticket);
        let store = &self.store;

        let (rooms, customers, bookings, (ticket, free)) = tokio::join!(
            async {
                if stale.rooms {
                    store.list_rooms().await.map(Some)
                } else {
                    Ok(None)
                }
            },
            async {
                if stale.customers {
                    store.list_customers(&token).await.map(Some)
                } else {
                    Ok(None)
                }
            },
            async {
                if stale.bookings {
                    store.list_bookings(&token).await.map(Some)
                } else {
                    Ok(None)
                }
            },
            fetch.run(),
        );

        if let Some(rooms) = observe_auth(&mut self.auth, rooms.map_err(BookingError::from))? {
            self.rooms = rooms;
        }
        if let Some(customers) = observe_auth(&mut self.auth, customers.map_err(BookingError::from))? {
            self.customers = customers;
        }
        if let Some(bookings) = observe_auth(&mut self.auth, bookings.map_err(BookingError::from))? {
            self.bookings = bookings;
        }
        self.apply_availability(ticket, free)?;
        Ok(())
    }
}
