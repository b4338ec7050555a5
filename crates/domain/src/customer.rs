//! Customer profiles.

use chrono::{DateTime, Utc};
use common::{BookingId, CustomerId, RoomId};
use serde::{Deserialize, Serialize};

use crate::booking::{Booking, BookingStatus};
use crate::error::BookingError;
use crate::stay::DateRange;

/// One line of a customer's booking history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub id: BookingId,
    pub room: RoomId,
    pub room_number: String,
    #[serde(flatten)]
    pub stay: DateRange,
    pub created_at: DateTime<Utc>,
    pub status: BookingStatus,
}

impl From<&Booking> for BookingSummary {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            room: booking.room,
            room_number: booking.room_number.clone(),
            stay: booking.stay,
            created_at: booking.created_at,
            status: booking.status,
        }
    }
}

/// A customer as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub name: String,
    pub phone: String,
    pub national_id: String,
    /// Count of bookings that still hold a room.
    #[serde(default)]
    pub total_bookings: usize,
    /// Newest first.
    #[serde(default)]
    pub booking_history: Vec<BookingSummary>,
}

impl Customer {
    /// Builds the outward view of a profile from its bookings, newest first.
    pub fn with_history(
        id: CustomerId,
        username: Option<String>,
        profile: CustomerDraft,
        bookings: &[&Booking],
    ) -> Self {
        let mut booking_history: Vec<BookingSummary> =
            bookings.iter().map(|b| BookingSummary::from(*b)).collect();
        booking_history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total_bookings = booking_history
            .iter()
            .filter(|b| b.status == BookingStatus::Active)
            .count();
        Self {
            id,
            username,
            name: profile.name,
            phone: profile.phone,
            national_id: profile.national_id,
            total_bookings,
            booking_history,
        }
    }
}

/// Profile fields for creating a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDraft {
    pub name: String,
    pub phone: String,
    pub national_id: String,
}

impl CustomerDraft {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        national_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            national_id: national_id.into(),
        }
    }

    pub fn validate(&self) -> Result<(), BookingError> {
        require("name", &self.name)?;
        require("phone", &self.phone)?;
        require("national_id", &self.national_id)
    }
}

/// Partial customer update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
}

impl CustomerPatch {
    /// A patch replacing every field, as a full update does.
    pub fn replace_with(draft: CustomerDraft) -> Self {
        Self {
            name: Some(draft.name),
            phone: Some(draft.phone),
            national_id: Some(draft.national_id),
        }
    }

    pub fn validate(&self) -> Result<(), BookingError> {
        for (field, value) in [
            ("name", &self.name),
            ("phone", &self.phone),
            ("national_id", &self.national_id),
        ] {
            if let Some(value) = value {
                require(field, value)?;
            }
        }
        Ok(())
    }

    pub fn apply(self, draft: &mut CustomerDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(phone) = self.phone {
            draft.phone = phone;
        }
        if let Some(national_id) = self.national_id {
            draft.national_id = national_id;
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), BookingError> {
    if value.trim().is_empty() {
        Err(BookingError::field(field, "This field may not be blank."))
    } else {
        Ok(())
    }
}
