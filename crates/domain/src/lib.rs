//! Domain layer for the hotel booking engine.
//!
//! This crate provides the core booking abstractions including:
//! - Half-open stay ranges and overlap rules
//! - Availability resolution over rooms and bookings
//! - One-shot booking intents carried across sign-in
//! - The booking lifecycle state machine and payment references
//! - The error taxonomy shared by the store and the sessions

pub mod auth;
pub mod availability;
pub mod booking;
pub mod clock;
pub mod customer;
pub mod error;
pub mod intent;
pub mod lifecycle;
pub mod money;
pub mod payment;
pub mod room;
pub mod stay;

pub use auth::{AccessToken, AuthGrant, AuthSession, Principal, Registration, Role};
pub use availability::AvailabilityResolver;
pub use booking::{Booking, BookingRequest, BookingStatus};
pub use clock::{Clock, FixedClock, SystemClock};
pub use customer::{BookingSummary, Customer, CustomerDraft, CustomerPatch};
pub use error::{BookingError, ErrorKind};
pub use intent::{AppliedIntent, BookingIntent, IntentSlot, IntentState};
pub use lifecycle::{BookingLifecycle, LifecycleError, LifecycleState, SubmissionOutcome};
pub use money::{Money, MoneyParseError};
pub use payment::{
    PaymentDetails, PaymentMethod, PaymentReference, PaymentReferenceGenerator,
    UnknownPaymentMethod,
};
pub use room::{MAX_ROOM_PRICE, Room, RoomDraft, RoomPatch, RoomType};
pub use stay::{DATE_FORMAT, DateRange, DateRangeError, parse_date};
