//! The authoritative hotel store.
//!
//! [`HotelStore`] is the contract every booking session talks to. The
//! in-memory implementation is the system of record for rooms, customers,
//! bookings and the transaction ledger, and performs booking creation as a
//! single check-and-insert so overlapping submissions cannot both succeed.

pub mod error;
pub mod ledger;
pub mod memory;
pub mod store;
pub mod wire;

pub use error::{Result, StoreError};
pub use ledger::{Transaction, TransactionType};
pub use memory::InMemoryHotelStore;
pub use store::HotelStore;
pub use wire::ErrorBody;
