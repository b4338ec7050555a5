//! Bookings and the booking submission payload.

use chrono::{DateTime, Utc};
use common::{BookingId, CustomerId, RoomId};
use serde::{Deserialize, Serialize};

use crate::payment::{PaymentDetails, PaymentMethod, PaymentReference};
use crate::stay::DateRange;

/// Whether a booking still holds its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Active,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "active",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A room held by a customer for a stay.
///
/// Bookings are never edited; cancellation flips `status` and leaves the
/// record in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub room: RoomId,
    #[serde(default)]
    pub room_number: String,
    pub customer: CustomerId,
    #[serde(default)]
    pub customer_name: String,
    #[serde(flatten)]
    pub stay: DateRange,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentDetails>,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }

    /// Returns true if this booking holds `room` for any night of `stay`.
    pub fn blocks(&self, room: RoomId, stay: &DateRange) -> bool {
        self.is_active() && self.room == room && self.stay.overlaps(stay)
    }
}

/// Payload sent to the store to create a booking.
///
/// Customers book for themselves with payment fields; staff book on behalf
/// of an explicit customer and may omit payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub room: RoomId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerId>,
    #[serde(flatten)]
    pub stay: DateRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<PaymentReference>,
}

impl BookingRequest {
    /// A self-service booking carrying its payment details.
    pub fn for_self(room: RoomId, stay: DateRange, payment: PaymentDetails) -> Self {
        Self {
            room,
            customer: None,
            stay,
            payment_method: Some(payment.method),
            payment_reference: Some(payment.reference),
        }
    }

    /// A staff booking for `customer`.
    pub fn on_behalf_of(room: RoomId, customer: CustomerId, stay: DateRange) -> Self {
        Self {
            room,
            customer: Some(customer),
            stay,
            payment_method: None,
            payment_reference: None,
        }
    }
}
