//! Booking lifecycle state machine.
//!
//! A [`BookingLifecycle`] follows one booking from the local draft through
//! submission to the store and, once active, to cancellation. The store is
//! the authority on overlaps; the lifecycle only records what it answered
//! and tells the caller how to react.

mod state;

pub use state::LifecycleState;

use common::{BookingId, CustomerId, RoomId};
use thiserror::Error;

use crate::auth::Principal;
use crate::booking::{Booking, BookingRequest, BookingStatus};
use crate::error::BookingError;
use crate::payment::PaymentDetails;
use crate::room::Room;
use crate::stay::{DateRange, DateRangeError};

/// Errors raised by local lifecycle checks. No store call has been made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Cannot {action} a booking in {current_state} state.")]
    InvalidTransition {
        current_state: LifecycleState,
        action: &'static str,
    },

    #[error("{0}")]
    InvalidStay(#[from] DateRangeError),

    #[error("Select a room.")]
    NoRoomSelected,

    #[error("Room {room_id} is not available for the selected dates.")]
    RoomUnavailable { room_id: RoomId },

    #[error("Choose a payment method.")]
    MissingPayment,

    #[error("You do not have permission to cancel booking {booking_id}.")]
    NotOwner { booking_id: BookingId },

    #[error("Booking {booking_id} not found or not cancellable.")]
    NotCancellable { booking_id: BookingId },
}

/// How the caller should react to a store response for a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The booking exists. Availability and booking lists are now stale.
    Booked(Booking),
    /// The store refused on overlap or a business rule. The selection is
    /// stale: re-resolve availability before letting the user pick again.
    Conflict(BookingError),
    /// The store refused a field; the user corrects it and resubmits.
    FieldRejected(BookingError),
    /// The store could not be reached or failed; the identical request may be
    /// sent again with [`BookingLifecycle::resubmit`].
    RetryAllowed(BookingError),
    /// Any other refusal (authorization, missing target).
    Refused(BookingError),
}

/// One booking's progress through the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingLifecycle {
    state: LifecycleState,
    stay: DateRange,
    room: Option<RoomId>,
    payment: Option<PaymentDetails>,
    pending: Option<BookingRequest>,
    booking: Option<Booking>,
    rejection: Option<BookingError>,
}

impl BookingLifecycle {
    /// Starts a draft for `stay` with no room selected.
    pub fn draft(stay: DateRange) -> Self {
        Self {
            state: LifecycleState::Draft,
            stay,
            room: None,
            payment: None,
            pending: None,
            booking: None,
            rejection: None,
        }
    }

    /// Wraps an existing booking, `Active` or `Cancelled` according to its status.
    pub fn from_booking(booking: Booking) -> Self {
        let state = match booking.status {
            BookingStatus::Active => LifecycleState::Active,
            BookingStatus::Cancelled => LifecycleState::Cancelled,
        };
        Self {
            state,
            stay: booking.stay,
            room: Some(booking.room),
            payment: booking.payment.clone(),
            pending: None,
            booking: Some(booking),
            rejection: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn stay(&self) -> DateRange {
        self.stay
    }

    pub fn room(&self) -> Option<RoomId> {
        self.room
    }

    pub fn payment(&self) -> Option<&PaymentDetails> {
        self.payment.as_ref()
    }

    pub fn booking(&self) -> Option<&Booking> {
        self.booking.as_ref()
    }

    pub fn rejection(&self) -> Option<&BookingError> {
        self.rejection.as_ref()
    }

    /// The request awaiting a store response, if any.
    pub fn pending_request(&self) -> Option<&BookingRequest> {
        self.pending.as_ref()
    }

    /// Changes the stay. Leaving the payment step discards the payment details.
    pub fn set_stay(&mut self, stay: DateRange) -> Result<(), LifecycleError> {
        self.ensure(self.state.can_edit(), "change the dates of")?;
        if self.stay != stay {
            self.stay = stay;
            self.back_to_draft();
        }
        Ok(())
    }

    /// Changes or clears the selected room. Leaving the payment step discards
    /// the payment details.
    pub fn select_room(&mut self, room: Option<RoomId>) -> Result<(), LifecycleError> {
        self.ensure(self.state.can_edit(), "change the room of")?;
        if self.room != room {
            self.room = room;
            self.back_to_draft();
        }
        Ok(())
    }

    /// `Draft -> AwaitingPayment`.
    ///
    /// Requires a valid stay and a selected room that is present in
    /// `available`, the last resolved availability.
    pub fn begin_payment(
        &mut self,
        available: &[Room],
        payment: PaymentDetails,
    ) -> Result<(), LifecycleError> {
        self.ensure(self.state.can_begin_payment(), "enter payment for")?;
        self.stay.validate()?;
        let room_id = self.room.ok_or(LifecycleError::NoRoomSelected)?;
        if !available.iter().any(|r| r.id == room_id) {
            return Err(LifecycleError::RoomUnavailable { room_id });
        }
        self.payment = Some(payment);
        self.state = LifecycleState::AwaitingPayment;
        Ok(())
    }

    /// Replaces the payment details while awaiting payment.
    pub fn change_payment(&mut self, payment: PaymentDetails) -> Result<(), LifecycleError> {
        self.ensure(self.state.can_change_method(), "change the payment of")?;
        self.payment = Some(payment);
        Ok(())
    }

    /// `AwaitingPayment -> Submitted`, returning the payload to send.
    pub fn submit(&mut self) -> Result<BookingRequest, LifecycleError> {
        self.ensure(self.state.can_submit(), "submit")?;
        self.stay.validate()?;
        let room = self.room.ok_or(LifecycleError::NoRoomSelected)?;
        let payment = self.payment.clone().ok_or(LifecycleError::MissingPayment)?;
        let request = BookingRequest::for_self(room, self.stay, payment);
        self.mark_submitted(request.clone());
        Ok(request)
    }

    /// `Draft -> Submitted` for a staff booking on behalf of `customer`.
    pub fn submit_on_behalf_of(
        &mut self,
        customer: CustomerId,
    ) -> Result<BookingRequest, LifecycleError> {
        self.ensure(self.state.can_submit_on_behalf(), "submit")?;
        self.stay.validate()?;
        let room = self.room.ok_or(LifecycleError::NoRoomSelected)?;
        let request = BookingRequest::on_behalf_of(room, customer, self.stay);
        self.mark_submitted(request.clone());
        Ok(request)
    }

    /// The identical payload again after a transport failure.
    pub fn resubmit(&self) -> Result<BookingRequest, LifecycleError> {
        self.ensure(self.state.can_record_outcome(), "resubmit")?;
        self.pending.clone().ok_or(LifecycleError::InvalidTransition {
            current_state: self.state,
            action: "resubmit",
        })
    }

    /// `Submitted -> Active | Rejected`, or stays `Submitted` on transport failure.
    pub fn record_outcome(
        &mut self,
        response: Result<Booking, BookingError>,
    ) -> Result<SubmissionOutcome, LifecycleError> {
        self.ensure(self.state.can_record_outcome(), "record an outcome for")?;
        let outcome = match response {
            Ok(booking) => {
                self.state = LifecycleState::Active;
                self.pending = None;
                self.booking = Some(booking.clone());
                SubmissionOutcome::Booked(booking)
            }
            Err(err @ BookingError::Transport(_)) => SubmissionOutcome::RetryAllowed(err),
            Err(err) => {
                self.state = LifecycleState::Rejected;
                self.pending = None;
                self.rejection = Some(err.clone());
                match err {
                    BookingError::Conflict(_) => SubmissionOutcome::Conflict(err),
                    BookingError::Field { .. } => SubmissionOutcome::FieldRejected(err),
                    _ => SubmissionOutcome::Refused(err),
                }
            }
        };
        Ok(outcome)
    }

    /// A fresh lifecycle continuing from a rejected one.
    ///
    /// Keeps the stay. After a conflict the room is dropped since the
    /// selection is known to be stale; otherwise room and payment carry over
    /// so the user stays on the payment step.
    pub fn revise(&self) -> Option<BookingLifecycle> {
        if self.state != LifecycleState::Rejected {
            return None;
        }
        let mut next = BookingLifecycle::draft(self.stay);
        if matches!(self.rejection, Some(BookingError::Conflict(_))) {
            return Some(next);
        }
        next.room = self.room;
        if self.room.is_some() && self.payment.is_some() {
            next.payment = self.payment.clone();
            next.state = LifecycleState::AwaitingPayment;
        }
        Some(next)
    }

    /// Checks that `principal` may cancel this booking and returns its id.
    ///
    /// Customers may cancel their own bookings; staff may cancel any.
    pub fn request_cancellation(&self, principal: &Principal) -> Result<BookingId, LifecycleError> {
        let booking = self.booking.as_ref().ok_or(LifecycleError::InvalidTransition {
            current_state: self.state,
            action: "cancel",
        })?;
        if !self.state.can_cancel() {
            return Err(LifecycleError::NotCancellable {
                booking_id: booking.id,
            });
        }
        let owns = principal.customer_id == Some(booking.customer);
        if !principal.is_staff() && !owns {
            return Err(LifecycleError::NotOwner {
                booking_id: booking.id,
            });
        }
        Ok(booking.id)
    }

    /// `Active -> Cancelled` once the store confirms.
    pub fn record_cancellation(&mut self, response: Result<(), BookingError>) -> Result<(), BookingError> {
        self.ensure(self.state.can_cancel(), "cancel")?;
        response?;
        self.state = LifecycleState::Cancelled;
        if let Some(booking) = self.booking.as_mut() {
            booking.status = BookingStatus::Cancelled;
        }
        Ok(())
    }

    fn back_to_draft(&mut self) {
        if self.state == LifecycleState::AwaitingPayment {
            self.state = LifecycleState::Draft;
            self.payment = None;
        }
    }

    fn mark_submitted(&mut self, request: BookingRequest) {
        self.pending = Some(request);
        self.rejection = None;
        self.state = LifecycleState::Submitted;
    }

    fn ensure(&self, allowed: bool, action: &'static str) -> Result<(), LifecycleError> {
        if allowed {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                current_state: self.state,
                action,
            })
        }
    }
}
