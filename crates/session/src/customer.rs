//! Self-service booking session for a signed-in customer.

use chrono::NaiveDate;
use common::{BookingId, RoomId};
use domain::{
    AuthSession, Booking, BookingError, BookingLifecycle, BookingRequest, Clock, DateRange,
    IntentSlot, LifecycleState, Money, PaymentDetails, PaymentMethod, PaymentReferenceGenerator,
    Principal, Room, SubmissionOutcome,
};
use store::HotelStore;

use crate::availability::{AvailabilityFetch, AvailabilityTicket, AvailabilityView};
use crate::observe_auth;

const INTENT_APPLIED: &str = "Booking details loaded. Confirm to place your booking.";
const INTENT_ROOM_TAKEN: &str =
    "The room you picked is no longer available for those dates. Choose another room.";
const BOOKED: &str = "Room booked successfully.";
const CANCELLED: &str = "Booking cancelled successfully.";

/// What a call to [`CustomerBookingSession::book`] achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingStep {
    /// First step: the payment details to confirm.
    AwaitingPayment(PaymentDetails),
    /// Second step: the store accepted the booking.
    Booked(Booking),
}

/// One customer's booking screen.
///
/// The session owns its [`AuthSession`]; any call the store refuses as
/// unauthenticated clears it.
pub struct CustomerBookingSession<S, C> {
    store: S,
    auth: AuthSession,
    clock: C,
    principal: Principal,
    check_in: NaiveDate,
    stay_days: u32,
    availability: AvailabilityView,
    lifecycle: BookingLifecycle,
    payment_method: PaymentMethod,
    references: PaymentReferenceGenerator,
    bookings: Vec<Booking>,
    notice: Option<String>,
}

impl<S, C> CustomerBookingSession<S, C>
where
    S: HotelStore + Clone,
    C: Clock,
{
    /// Opens the booking screen.
    ///
    /// Profile, bookings and availability are fetched concurrently. A pending
    /// intent seeds the stay and, if its room is still free, the selection;
    /// it is consumed only once the screen has loaded. On success the session
    /// takes over `auth`.
    #[tracing::instrument(skip_all)]
    pub async fn enter(
        store: S,
        auth: &mut AuthSession,
        intent: &mut IntentSlot,
        clock: C,
    ) -> Result<Self, BookingError> {
        let token = auth.require_token()?.clone();
        let carried = intent.peek().copied();
        let stay = match carried {
            Some(intent) => intent.stay(),
            None => DateRange::from_offset(clock.today(), 1)?,
        };

        let mut availability = AvailabilityView::new();
        let ticket = availability.request(stay);
        let (principal, bookings, rooms) = tokio::join!(
            store.me(&token),
            store.list_bookings(&token),
            store.available_rooms(stay),
        );
        let principal = observe_auth(auth, principal.map_err(BookingError::from))?;
        let bookings = observe_auth(auth, bookings.map_err(BookingError::from))?;
        let rooms = rooms.map_err(BookingError::from)?;

        if principal.booking_identity().is_none() {
            return Err(BookingError::Forbidden(
                "Only customers with a profile can book rooms for themselves.".to_string(),
            ));
        }
        availability.apply(ticket, rooms);

        let mut lifecycle = BookingLifecycle::draft(stay);
        let mut notice = None;
        if intent.take().is_some()
            && let Some(carried) = carried
        {
            let applied = carried.resolve_against(availability.rooms());
            lifecycle.select_room(applied.room)?;
            let message = if applied.room_dropped {
                INTENT_ROOM_TAKEN
            } else {
                INTENT_APPLIED
            };
            notice = Some(message.to_string());
            tracing::info!(room_dropped = applied.room_dropped, "booking intent applied");
        }

        Ok(Self {
            store,
            auth: std::mem::take(auth),
            clock,
            principal,
            check_in: stay.check_in,
            stay_days: stay.nights().max(1) as u32,
            availability,
            lifecycle,
            payment_method: PaymentMethod::default(),
            references: PaymentReferenceGenerator::new(),
            bookings,
            notice,
        })
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    /// Hands the credentials back, ending the session.
    pub fn into_auth(self) -> AuthSession {
        self.auth
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn stay_days(&self) -> u32 {
        self.stay_days
    }

    pub fn stay(&self) -> DateRange {
        self.lifecycle.stay()
    }

    pub fn available_rooms(&self) -> &[Room] {
        self.availability.rooms()
    }

    pub fn availability(&self) -> &AvailabilityView {
        &self.availability
    }

    pub fn selected_room(&self) -> Option<RoomId> {
        self.lifecycle.room()
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Payment details shown on the confirmation step.
    pub fn pending_payment(&self) -> Option<&PaymentDetails> {
        self.lifecycle.payment()
    }

    /// The customer's bookings, newest first.
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Message for the user about the last action, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Display-only total for the selected room. The store does not confirm it.
    pub fn total_price(&self) -> Option<Money> {
        let room = self.availability.room(self.lifecycle.room()?)?;
        Some(room.quote(self.stay().nights()))
    }

    /// Moves the stay to start on `check_in`, keeping its length.
    ///
    /// Returns the availability request for the new stay; the caller runs it
    /// and hands the result to [`Self::apply_availability`].
    pub fn set_check_in(&mut self, check_in: NaiveDate) -> Result<AvailabilityFetch<S>, BookingError> {
        let stay = DateRange::from_offset(check_in, self.stay_days)?;
        self.lifecycle.set_stay(stay)?;
        self.check_in = check_in;
        Ok(self.availability_fetch())
    }

    /// Changes the stay length. Zero is treated as one night.
    pub fn set_stay_days(&mut self, days: u32) -> Result<AvailabilityFetch<S>, BookingError> {
        let days = days.max(1);
        let stay = DateRange::from_offset(self.check_in, days)?;
        self.lifecycle.set_stay(stay)?;
        self.stay_days = days;
        Ok(self.availability_fetch())
    }

    /// Issues an availability request for the current stay.
    pub fn availability_fetch(&mut self) -> AvailabilityFetch<S> {
        let ticket = self.availability.request(self.stay());
        AvailabilityFetch::new(self.store.clone(), ticket)
    }

    /// Applies a completed availability request.
    ///
    /// Returns `Ok(false)` if a newer request has been issued since; the
    /// result is discarded. A selected room that is no longer free is
    /// deselected.
    pub fn apply_availability(
        &mut self,
        ticket: AvailabilityTicket,
        result: Result<Vec<Room>, BookingError>,
    ) -> Result<bool, BookingError> {
        if !self.availability.is_latest(&ticket) {
            return Ok(self.availability.apply(ticket, Vec::new()));
        }
        let rooms = observe_auth(&mut self.auth, result)?;
        self.availability.apply(ticket, rooms);

        if let Some(selected) = self.lifecycle.room()
            && !self.availability.contains(selected)
            && self.lifecycle.state().can_edit()
        {
            self.lifecycle.select_room(None)?;
            self.notice = Some("The selected room is no longer available for these dates.".to_string());
        }
        Ok(true)
    }

    /// Re-resolves availability for the current stay.
    pub async fn refresh_availability(&mut self) -> Result<(), BookingError> {
        let (ticket, result) = self.availability_fetch().run().await;
        self.apply_availability(ticket, result).map(|_| ())
    }

    /// Selects a room from the resolved availability, or clears the selection.
    pub fn select_room(&mut self, room: Option<RoomId>) -> Result<(), BookingError> {
        if let Some(id) = room
            && !self.availability.contains(id)
        {
            return Err(BookingError::validation(
                "Selected room is not available for these dates.",
            ));
        }
        self.lifecycle.select_room(room)?;
        Ok(())
    }

    /// Switches the payment method. On the confirmation step the reference is
    /// regenerated so its prefix matches.
    pub fn change_payment_method(&mut self, method: PaymentMethod) -> Result<(), BookingError> {
        self.payment_method = method;
        if self.lifecycle.state().can_change_method() {
            let details = self.references.details(method, self.clock.now());
            self.lifecycle.change_payment(details)?;
        }
        Ok(())
    }

    /// Advances the two-step booking flow.
    ///
    /// From the draft this enters the payment step and returns the generated
    /// details. From the payment step it submits. After a transport failure
    /// it sends the identical request again.
    #[tracing::instrument(skip(self), fields(state = %self.lifecycle.state()))]
    pub async fn book(&mut self) -> Result<BookingStep, BookingError> {
        match self.lifecycle.state() {
            LifecycleState::Draft => {
                let details = self.references.details(self.payment_method, self.clock.now());
                self.lifecycle
                    .begin_payment(self.availability.rooms(), details.clone())?;
                self.notice = None;
                Ok(BookingStep::AwaitingPayment(details))
            }
            LifecycleState::AwaitingPayment => {
                let request = self.lifecycle.submit()?;
                self.send(request).await
            }
            _ => {
                let request = self.lifecycle.resubmit()?;
                self.send(request).await
            }
        }
    }

    async fn send(&mut self, request: BookingRequest) -> Result<BookingStep, BookingError> {
        let token = self.auth.require_token()?.clone();
        let response = self
            .store
            .create_booking(&token, request)
            .await
            .map_err(BookingError::from);

        match self.lifecycle.record_outcome(response)? {
            SubmissionOutcome::Booked(booking) => {
                tracing::info!(booking_id = %booking.id, "booking placed");
                self.lifecycle = BookingLifecycle::draft(self.stay());
                self.notice = Some(BOOKED.to_string());
                if let Err(err) = self.reload().await {
                    tracing::warn!(error = %err, "reload after booking failed");
                }
                Ok(BookingStep::Booked(booking))
            }
            SubmissionOutcome::Conflict(err) => {
                self.revise();
                self.notice = Some(err.message().to_string());
                if let Err(refresh) = self.refresh_availability().await {
                    tracing::warn!(error = %refresh, "availability refresh after conflict failed");
                    self.availability.invalidate();
                }
                Err(err)
            }
            SubmissionOutcome::FieldRejected(err) => {
                self.revise();
                self.notice = Some(err.message().to_string());
                Err(err)
            }
            SubmissionOutcome::RetryAllowed(err) => {
                self.notice = Some(err.message().to_string());
                Err(err)
            }
            SubmissionOutcome::Refused(err) => {
                self.revise();
                observe_auth(&mut self.auth, Err(err))
            }
        }
    }

    fn revise(&mut self) {
        if let Some(next) = self.lifecycle.revise() {
            self.lifecycle = next;
        }
    }

    /// Cancels one of the customer's bookings.
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
        let response = self
            .store
            .cancel_booking(&token, id)
            .await
            .map_err(BookingError::from);
        let response = observe_auth(&mut self.auth, response);
        lifecycle.record_cancellation(response)?;

        self.notice = Some(CANCELLED.to_string());
        if let Err(err) = self.reload().await {
            tracing::warn!(error = %err, "reload after cancellation failed");
        }
        Ok(())
    }

    /// Re-fetches bookings and availability together.
    pub async fn reload(&mut self) -> Result<(), BookingError> {
        let token = self.auth.require_token()?.clone();
        let fetch = self.availability_fetch();
        let (bookings, (ticket, rooms)) =
            tokio::join!(self.store.list_bookings(&token), fetch.run());
        self.bookings = observe_auth(&mut self.auth, bookings.map_err(BookingError::from))?;
        self.apply_availability(ticket, rooms)?;
        Ok(())
    }

    /// Signs out: revokes the token and clears local state.
    pub async fn logout(&mut self) -> Result<(), BookingError> {
        if let Some(token) = self.auth.token().cloned()
            && let Err(err) = self.store.logout(&token).await
        {
            tracing::warn!(error = %err, "token revocation failed");
        }
        self.auth.clear();
        self.bookings.clear();
        self.availability.clear();
        self.lifecycle = BookingLifecycle::draft(self.stay());
        self.notice = None;
        Ok(())
    }
}
