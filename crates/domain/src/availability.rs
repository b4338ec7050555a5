//! Availability resolution over an inventory and its bookings.

use std::collections::HashSet;

use common::RoomId;

use crate::booking::Booking;
use crate::room::Room;
use crate::stay::{DateRange, DateRangeError};

/// Computes which rooms are free for a stay.
///
/// Pure over its inputs. On the client this is a prediction of what the
/// store will accept; the store's own check at booking time is what counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvailabilityResolver;

impl AvailabilityResolver {
    /// Returns the rooms with no active booking overlapping `range`.
    ///
    /// Rooms keep the order in which `inventory` supplied them. An invalid
    /// range yields an error rather than an empty list so callers can tell
    /// "nothing free" from "bad question".
    pub fn resolve(
        inventory: &[Room],
        bookings: &[Booking],
        range: &DateRange,
    ) -> Result<Vec<Room>, DateRangeError> {
        range.validate()?;

        let occupied: HashSet<RoomId> = bookings
            .iter()
            .filter(|b| b.is_active() && b.stay.overlaps(range))
            .map(|b| b.room)
            .collect();

        Ok(inventory
            .iter()
            .filter(|room| !occupied.contains(&room.id))
            .cloned()
            .collect())
    }

    /// Returns true if no active booking holds `room` for any night of `range`.
    pub fn is_free(room: RoomId, bookings: &[Booking], range: &DateRange) -> bool {
        !bookings.iter().any(|b| b.blocks(room, range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::BookingStatus;
    use crate::money::Money;
    use crate::room::RoomType;
    use chrono::{NaiveDate, Utc};
    use common::{BookingId, CustomerId};

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn room(number: &str) -> Room {
        Room {
            id: RoomId::new(),
            room_number: number.to_string(),
            room_type: RoomType::from("single"),
            price: Money::from_units(50),
            is_available: true,
        }
    }

    fn booking(room: &Room, from: u32, to: u32) -> Booking {
        Booking {
            id: BookingId::new(),
            room: room.id,
            room_number: room.room_number.clone(),
            customer: CustomerId::new(),
            customer_name: "Guest".into(),
            stay: DateRange::new(jan(from), jan(to)),
            created_at: Utc::now(),
            status: BookingStatus::Active,
            payment: None,
        }
    }

    #[test]
    fn test_excludes_overlapping_room() {
        let a = room("A");
        let b = room("B");
        let bookings = vec![booking(&b, 2, 4)];
        let free = AvailabilityResolver::resolve(
            &[a.clone(), b],
            &bookings,
            &DateRange::new(jan(1), jan(3)),
        )
        .unwrap();
        assert_eq!(free, vec![a]);
    }

    #[test]
    fn test_back_to_back_booking_leaves_room_free() {
        let a = room("A");
        let bookings = vec![booking(&a, 1, 3)];
        let free =
            AvailabilityResolver::resolve(&[a.clone()], &bookings, &DateRange::new(jan(3), jan(5)))
                .unwrap();
        assert_eq!(free.len(), 1);
    }

    #[test]
    fn test_cancelled_booking_is_ignored() {
        let a = room("A");
        let mut cancelled = booking(&a, 1, 5);
        cancelled.status = BookingStatus::Cancelled;
        let free =
            AvailabilityResolver::resolve(&[a], &[cancelled], &DateRange::new(jan(2), jan(3)))
                .unwrap();
        assert_eq!(free.len(), 1);
    }

    #[test]
    fn test_preserves_inventory_order() {
        let rooms = vec![room("305"), room("101"), room("204")];
        let free =
            AvailabilityResolver::resolve(&rooms, &[], &DateRange::new(jan(1), jan(2))).unwrap();
        let numbers: Vec<_> = free.iter().map(|r| r.room_number.as_str()).collect();
        assert_eq!(numbers, ["305", "101", "204"]);
    }

    #[test]
    fn test_invalid_range_fails_fast() {
        let result =
            AvailabilityResolver::resolve(&[room("A")], &[], &DateRange::new(jan(3), jan(3)));
        assert!(matches!(result, Err(DateRangeError::NotIncreasing { .. })));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let a = room("A");
        let b = room("B");
        let bookings = vec![booking(&a, 5, 8)];
        let inventory = [a, b];
        let range = DateRange::new(jan(6), jan(7));
        let first = AvailabilityResolver::resolve(&inventory, &bookings, &range).unwrap();
        let second = AvailabilityResolver::resolve(&inventory, &bookings, &range).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_is_free() {
        let a = room("A");
        let bookings = vec![booking(&a, 2, 4)];
        assert!(!AvailabilityResolver::is_free(a.id, &bookings, &DateRange::new(jan(3), jan(6))));
        assert!(AvailabilityResolver::is_free(a.id, &bookings, &DateRange::new(jan(4), jan(6))));
    }
}
