//! Last-request-wins availability cache.

use common::RoomId;
use domain::{BookingError, DateRange, Room};
use store::HotelStore;

/// Identifies one availability request by the exact stay it asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityTicket {
    range: DateRange,
}

impl AvailabilityTicket {
    pub fn range(&self) -> DateRange {
        self.range
    }
}

/// Rooms last resolved for the session's stay.
///
/// Requests may complete out of order. A result is applied only if its
/// ticket matches the most recently issued request; anything else is a stale
/// answer to a question the user no longer asks and is discarded.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityView {
    latest: Option<DateRange>,
    resolved_for: Option<DateRange>,
    rooms: Vec<Room>,
}

impl AvailabilityView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `range` as the latest request.
    pub fn request(&mut self, range: DateRange) -> AvailabilityTicket {
        self.latest = Some(range);
        AvailabilityTicket { range }
    }

    /// Returns true if `ticket` belongs to the latest request.
    pub fn is_latest(&self, ticket: &AvailabilityTicket) -> bool {
        self.latest == Some(ticket.range)
    }

    /// Stores `rooms` if `ticket` is still the latest request. Returns false
    /// for stale results.
    pub fn apply(&mut self, ticket: AvailabilityTicket, rooms: Vec<Room>) -> bool {
        if !self.is_latest(&ticket) {
            metrics::counter!("stale_availability_discarded_total").increment(1);
            tracing::debug!(
                stale = %ticket.range,
                latest = ?self.latest.map(|r| r.to_string()),
                "discarding stale availability result"
            );
            return false;
        }
        self.rooms = rooms;
        self.resolved_for = Some(ticket.range);
        true
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: RoomId) -> bool {
        self.room(id).is_some()
    }

    /// The stay the displayed rooms were resolved for.
    pub fn resolved_for(&self) -> Option<DateRange> {
        self.resolved_for
    }

    /// Returns true if the displayed rooms answer the latest request.
    pub fn is_current(&self) -> bool {
        self.latest.is_some() && self.latest == self.resolved_for
    }

    /// Drops the displayed rooms while keeping the latest request, so nothing
    /// can be selected until that request resolves again.
    pub fn invalidate(&mut self) {
        self.rooms.clear();
        self.resolved_for = None;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// An issued availability request, ready to run against the store.
///
/// Owns its own store handle so the session stays free to change dates while
/// the request is in flight.
pub struct AvailabilityFetch<S> {
    store: S,
    ticket: AvailabilityTicket,
}

impl<S: HotelStore> AvailabilityFetch<S> {
    pub(crate) fn new(store: S, ticket: AvailabilityTicket) -> Self {
        Self { store, ticket }
    }

    pub fn ticket(&self) -> AvailabilityTicket {
        self.ticket
    }

    pub async fn run(self) -> (AvailabilityTicket, Result<Vec<Room>, BookingError>) {
        let result = self
            .store
            .available_rooms(self.ticket.range)
            .await
            .map_err(BookingError::from);
        (self.ticket, result)
    }
}
