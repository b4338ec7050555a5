//! Booking intents carried across the authentication detour.
//!
//! An anonymous visitor who picks a room on the public search has to sign in
//! before booking. The choice travels with the navigation as an
//! [`IntentSlot`], is applied once by the booking screen, and is then gone.

use chrono::NaiveDate;
use common::RoomId;
use serde::{Deserialize, Serialize};

use crate::room::Room;
use crate::stay::DateRange;

/// A provisional, unpersisted room and date choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingIntent {
    pub room_id: RoomId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl BookingIntent {
    pub fn new(room_id: RoomId, stay: DateRange) -> Self {
        Self {
            room_id,
            check_in: stay.check_in,
            check_out: stay.check_out,
        }
    }

    /// The carried stay, or a one-night stay from check-in if the carried
    /// dates are not a valid range.
    pub fn stay(&self) -> DateRange {
        let carried = DateRange::new(self.check_in, self.check_out);
        if carried.is_valid() {
            return carried;
        }
        DateRange::from_offset(self.check_in, 1).unwrap_or(carried)
    }

    /// Applies the intent against the rooms free for its stay.
    ///
    /// The dates are always honored; the room is kept only if it is still
    /// free.
    pub fn resolve_against(&self, available: &[Room]) -> AppliedIntent {
        let room = available
            .iter()
            .any(|r| r.id == self.room_id)
            .then_some(self.room_id);
        AppliedIntent {
            stay: self.stay(),
            room,
            room_dropped: room.is_none(),
        }
    }
}

/// What a booking screen ends up with after applying an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedIntent {
    pub stay: DateRange,
    pub room: Option<RoomId>,
    /// True if the requested room was no longer free.
    pub room_dropped: bool,
}

/// Lifecycle of an intent held in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IntentState {
    /// Nothing was carried.
    #[default]
    Empty,
    /// Captured and not yet applied.
    Pending,
    /// Applied; the slot no longer yields it.
    Consumed,
}

/// One-shot carrier for a [`BookingIntent`].
///
/// Passed explicitly to the destination screen. [`IntentSlot::take`] yields
/// the intent the first time only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentSlot {
    intent: Option<BookingIntent>,
    state: IntentState,
}

impl IntentSlot {
    /// A slot carrying nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A slot carrying a freshly captured intent.
    pub fn carrying(intent: BookingIntent) -> Self {
        Self {
            intent: Some(intent),
            state: IntentState::Pending,
        }
    }

    pub fn state(&self) -> IntentState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == IntentState::Pending
    }

    /// Borrow the carried intent without consuming it.
    pub fn peek(&self) -> Option<&BookingIntent> {
        match self.state {
            IntentState::Pending => self.intent.as_ref(),
            IntentState::Empty | IntentState::Consumed => None,
        }
    }

    /// Consumes the intent: `Pending -> Consumed`. Later calls return `None`.
    pub fn take(&mut self) -> Option<BookingIntent> {
        if self.state != IntentState::Pending {
            return None;
        }
        self.state = IntentState::Consumed;
        let intent = self.intent.take();
        if let Some(intent) = &intent {
            tracing::debug!(room_id = %intent.room_id, "booking intent consumed");
        }
        intent
    }
}

impl From<Option<BookingIntent>> for IntentSlot {
    fn from(intent: Option<BookingIntent>) -> Self {
        match intent {
            Some(intent) => Self::carrying(intent),
            None => Self::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::room::RoomType;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn room(id: RoomId) -> Room {
        Room {
            id,
            room_number: "101".into(),
            room_type: RoomType::from("single"),
            price: Money::from_units(40),
            is_available: true,
        }
    }

    #[test]
    fn test_take_yields_once() {
        let intent = BookingIntent::new(RoomId::new(), DateRange::new(jan(10), jan(12)));
        let mut slot = IntentSlot::carrying(intent);
        assert!(slot.is_pending());
        assert_eq!(slot.take(), Some(intent));
        assert_eq!(slot.state(), IntentState::Consumed);
        assert_eq!(slot.take(), None);
        assert_eq!(slot.peek(), None);
    }

    #[test]
    fn test_empty_slot_yields_nothing() {
        let mut slot = IntentSlot::empty();
        assert_eq!(slot.take(), None);
        assert_eq!(slot.state(), IntentState::Empty);
    }

    #[test]
    fn test_unavailable_room_is_dropped_but_dates_kept() {
        let intent = BookingIntent::new(RoomId::new(), DateRange::new(jan(10), jan(12)));
        let applied = intent.resolve_against(&[room(RoomId::new())]);
        assert_eq!(applied.room, None);
        assert!(applied.room_dropped);
        assert_eq!(applied.stay, DateRange::new(jan(10), jan(12)));
    }

    #[test]
    fn test_available_room_is_kept() {
        let id = RoomId::new();
        let intent = BookingIntent::new(id, DateRange::new(jan(10), jan(12)));
        let applied = intent.resolve_against(&[room(id)]);
        assert_eq!(applied.room, Some(id));
        assert!(!applied.room_dropped);
    }

    #[test]
    fn test_invalid_carried_dates_fall_back_to_one_night() {
        let intent = BookingIntent {
            room_id: RoomId::new(),
            check_in: jan(10),
            check_out: jan(9),
        };
        assert_eq!(intent.stay(), DateRange::new(jan(10), jan(11)));
    }
}
