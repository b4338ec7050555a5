//! Transaction ledger kept alongside bookings.

use chrono::{DateTime, Utc};
use common::{BookingId, CustomerId, TransactionId};
use domain::{Booking, Money, Room};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Booking,
    Cancellation,
}

/// One ledger entry. Cancellations carry a negative amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub transaction_type: TransactionType,
    pub amount: Money,
    pub booking: Option<BookingId>,
    pub customer: Option<CustomerId>,
    pub date: DateTime<Utc>,
    pub notes: String,
}

/// Append-only list of transactions.
#[derive(Debug, Clone, Default)]
pub(crate) struct Ledger {
    entries: Vec<Transaction>,
}

impl Ledger {
    /// Records a new booking charged `amount`.
    pub(crate) fn record_booking(
        &mut self,
        booking: &Booking,
        room: &Room,
        amount: Money,
    ) -> &Transaction {
        let mut notes = format!(
            "Booked room {} for {} from {}",
            room.room_number, booking.customer_name, booking.stay
        );
        if let Some(payment) = &booking.payment {
            notes.push_str(&format!(" | payment: {} ({})", payment.method, payment.reference));
        }
        self.push(Transaction {
            id: TransactionId::new(),
            transaction_type: TransactionType::Booking,
            amount,
            booking: Some(booking.id),
            customer: Some(booking.customer),
            date: Utc::now(),
            notes,
        })
    }

    /// Reverses the amount charged for `booking`.
    pub(crate) fn record_cancellation(&mut self, booking: &Booking, room: &Room) -> &Transaction {
        let charged = self
            .entries
            .iter()
            .find(|t| {
                t.transaction_type == TransactionType::Booking && t.booking == Some(booking.id)
            })
            .map(|t| t.amount)
            .unwrap_or_else(|| room.quote(booking.stay.nights()));
        self.push(Transaction {
            id: TransactionId::new(),
            transaction_type: TransactionType::Cancellation,
            amount: -charged,
            booking: Some(booking.id),
            customer: Some(booking.customer),
            date: Utc::now(),
            notes: format!(
                "Cancelled room {} for {} from {}",
                room.room_number, booking.customer_name, booking.stay
            ),
        })
    }

    /// Entries newest first.
    pub(crate) fn newest_first(&self) -> Vec<Transaction> {
        self.entries.iter().rev().cloned().collect()
    }

    fn push(&mut self, transaction: Transaction) -> &Transaction {
        self.entries.push(transaction);
        &self.entries[self.entries.len() - 1]
    }
}
