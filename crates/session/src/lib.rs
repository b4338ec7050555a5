//! Booking sessions over a [`store::HotelStore`].
//!
//! A session holds one user's local view: the chosen stay, the rooms last
//! resolved for it, the booking in progress and the user's bookings. Every
//! mutation accepted by the store is followed by a re-fetch; the local view
//! is never patched in place.

pub mod availability;
pub mod customer;
pub mod staff;

pub use availability::{AvailabilityFetch, AvailabilityTicket, AvailabilityView};
pub use customer::{BookingStep, CustomerBookingSession};
pub use staff::StaffConsole;

use domain::{AuthSession, BookingError};

/// Drops the session's credentials if the store no longer accepts them.
pub(crate) fn observe_auth<T>(
    auth: &mut AuthSession,
    result: Result<T, BookingError>,
) -> Result<T, BookingError> {
    if let Err(BookingError::Unauthorized(_)) = &result {
        auth.clear();
    }
    result
}
