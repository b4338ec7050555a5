//! Shared identifier types for the hotel booking engine.

mod types;

pub use types::{BookingId, CustomerId, RoomId, TransactionId};
