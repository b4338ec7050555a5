//! Room inventory types.

use common::RoomId;
use serde::{Deserialize, Serialize};

use crate::error::BookingError;
use crate::money::Money;

/// Highest nightly rate a room may carry: ten digits, two of them decimal.
pub const MAX_ROOM_PRICE: Money = Money::from_cents(9_999_999_999);

/// Free-text room category such as `single`, `double` or `suite`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomType(String);

impl RoomType {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A sellable room.
///
/// `is_available` is a convenience flag maintained by the store ("no active
/// booking ends after today"); availability for a specific stay is always
/// computed from bookings instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub room_number: String,
    pub room_type: RoomType,
    /// Nightly rate.
    pub price: Money,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl Room {
    /// Display-only total for a stay of `nights` nights.
    pub fn quote(&self, nights: i64) -> Money {
        self.price.times(nights.max(0))
    }

    /// Total for a stay of `nights` nights, or `None` if it does not fit.
    pub fn checked_quote(&self, nights: i64) -> Option<Money> {
        self.price.checked_times(nights.max(0))
    }
}

/// Fields for creating a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDraft {
    pub room_number: String,
    pub room_type: RoomType,
    pub price: Money,
}

impl RoomDraft {
    pub fn new(room_number: impl Into<String>, room_type: impl Into<String>, price: Money) -> Self {
        Self {
            room_number: room_number.into(),
            room_type: RoomType::new(room_type),
            price,
        }
    }

    /// Checks required fields and the price sign before anything is sent.
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.room_number.trim().is_empty() {
            return Err(BookingError::field("room_number", "This field may not be blank."));
        }
        if self.room_type.as_str().trim().is_empty() {
            return Err(BookingError::field("room_type", "This field may not be blank."));
        }
        validate_price(self.price)
    }
}

/// Partial room update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<RoomType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
}

impl RoomPatch {
    pub fn validate(&self) -> Result<(), BookingError> {
        if let Some(number) = &self.room_number
            && number.trim().is_empty()
        {
            return Err(BookingError::field("room_number", "This field may not be blank."));
        }
        if let Some(room_type) = &self.room_type
            && room_type.as_str().trim().is_empty()
        {
            return Err(BookingError::field("room_type", "This field may not be blank."));
        }
        match self.price {
            Some(price) => validate_price(price),
            None => Ok(()),
        }
    }

    pub fn apply(self, room: &mut Room) {
        if let Some(number) = self.room_number {
            room.room_number = number;
        }
        if let Some(room_type) = self.room_type {
            room.room_type = room_type;
        }
        if let Some(price) = self.price {
            room.price = price;
        }
    }
}

fn validate_price(price: Money) -> Result<(), BookingError> {
    if price.is_negative() {
        Err(BookingError::field(
            "price",
            "Ensure this value is greater than or equal to 0.",
        ))
    } else if price > MAX_ROOM_PRICE {
        Err(BookingError::field(
            "price",
            "Ensure that there are no more than 10 digits in total.",
        ))
    } else {
        Ok(())
    }
}
