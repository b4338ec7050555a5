//! Integration tests for the in-memory authoritative store.
//!
//! These tests verify the overlap invariant under concurrent submissions,
//! uniqueness refusals, role scoping and the transaction ledger.

use chrono::NaiveDate;
use domain::{
    AuthGrant, BookingRequest, BookingStatus, CustomerDraft, CustomerPatch, DateRange,
    MAX_ROOM_PRICE, Money, PaymentMethod, PaymentReference, Registration, RoomDraft, RoomPatch,
};
use store::{HotelStore, InMemoryHotelStore, StoreError, TransactionType};

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

async fn guest(store: &InMemoryHotelStore, username: &str, national_id: &str) -> AuthGrant {
    store
        .register(Registration {
            username: username.into(),
            name: username.to_uppercase(),
            phone: "0711111111".into(),
            national_id: national_id.into(),
        })
        .await
        .unwrap()
}

fn self_booking(room: common::RoomId, stay: DateRange) -> BookingRequest {
    BookingRequest {
        room,
        customer: None,
        stay,
        payment_method: Some(PaymentMethod::MobileMoney),
        payment_reference: Some(PaymentReference::new("MM-20250101000000-1111")),
    }
}

mod overlap {
    use super::*;

    #[tokio::test]
    async fn concurrent_overlapping_submissions_only_one_succeeds() {
        let store = InMemoryHotelStore::new();
        let room = store
            .seed_room(RoomDraft::new("101", "double", Money::from_units(90)))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for n in 0..8 {
            let store = store.clone();
            let grant = guest(&store, &format!("guest{n}"), &format!("NID-{n}")).await;
            let stay = DateRange::new(jan(10 + (n % 2)), jan(13));
            let room_id = room.id;
            handles.push(tokio::spawn(async move {
                store
                    .create_booking(&grant.token, self_booking(room_id, stay))
                    .await
            }));
        }

        let mut created = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(StoreError::Rejected(message)) => {
                    assert_eq!(message, "Room is already booked for the selected date range.");
                    rejected += 1;
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(rejected, 7);
    }

    #[tokio::test]
    async fn back_to_back_stays_are_both_bookable() {
        let store = InMemoryHotelStore::new();
        let room = store
            .seed_room(RoomDraft::new("101", "double", Money::from_units(90)))
            .await
            .unwrap();
        let a = guest(&store, "a", "NID-A").await;
        let b = guest(&store, "b", "NID-B").await;

        store
            .create_booking(&a.token, self_booking(room.id, DateRange::new(jan(1), jan(3))))
            .await
            .unwrap();
        store
            .create_booking(&b.token, self_booking(room.id, DateRange::new(jan(3), jan(5))))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reversed_range_is_a_field_error() {
        let store = InMemoryHotelStore::new();
        let room = store
            .seed_room(RoomDraft::new("101", "double", Money::from_units(90)))
            .await
            .unwrap();
        let a = guest(&store, "a", "NID-A").await;

        let err = store
            .create_booking(&a.token, self_booking(room.id, DateRange::new(jan(5), jan(5))))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::field("check_out", "Check-out date must be later than check-in date.")
        );
    }
}

mod availability {
    use super::*;

    #[tokio::test]
    async fn resolves_only_free_rooms() {
        let store = InMemoryHotelStore::new();
        let room_a = store
            .seed_room(RoomDraft::new("A", "single", Money::from_units(40)))
            .await
            .unwrap();
        let room_b = store
            .seed_room(RoomDraft::new("B", "single", Money::from_units(40)))
            .await
            .unwrap();
        let grant = guest(&store, "a", "NID-A").await;
        store
            .create_booking(&grant.token, self_booking(room_b.id, DateRange::new(jan(2), jan(4))))
            .await
            .unwrap();

        let free = store
            .available_rooms(DateRange::new(jan(1), jan(3)))
            .await
            .unwrap();
        assert_eq!(free.iter().map(|r| r.id).collect::<Vec<_>>(), vec![room_a.id]);
    }

    #[tokio::test]
    async fn cancelling_releases_the_room() {
        let store = InMemoryHotelStore::new();
        let room = store
            .seed_room(RoomDraft::new("101", "single", Money::from_units(40)))
            .await
            .unwrap();
        let grant = guest(&store, "a", "NID-A").await;
        let stay = DateRange::new(jan(10), jan(12));
        let booking = store
            .create_booking(&grant.token, self_booking(room.id, stay))
            .await
            .unwrap();
        assert!(store.available_rooms(stay).await.unwrap().is_empty());

        store.cancel_booking(&grant.token, booking.id).await.unwrap();
        let free = store.available_rooms(stay).await.unwrap();
        assert_eq!(free[0].id, room.id);

        let again = store.cancel_booking(&grant.token, booking.id).await.unwrap_err();
        assert_eq!(
            again,
            StoreError::NotFound("Booking not found or already cancelled.".into())
        );
    }

    #[tokio::test]
    async fn invalid_range_is_a_bad_request() {
        let store = InMemoryHotelStore::new();
        let err = store
            .available_rooms(DateRange::new(jan(3), jan(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::BadRequest(_)));
    }
}

mod scoping {
    use super::*;

    #[tokio::test]
    async fn customers_see_and_cancel_only_their_own() {
        let store = InMemoryHotelStore::new();
        let room = store
            .seed_room(RoomDraft::new("101", "single", Money::from_units(40)))
            .await
            .unwrap();
        let alice = guest(&store, "alice", "NID-A").await;
        let bob = guest(&store, "bob", "NID-B").await;
        let staff = store.issue_staff_token("desk").await;

        let booking = store
            .create_booking(&alice.token, self_booking(room.id, DateRange::new(jan(1), jan(2))))
            .await
            .unwrap();

        assert_eq!(store.list_bookings(&alice.token).await.unwrap().len(), 1);
        assert!(store.list_bookings(&bob.token).await.unwrap().is_empty());
        assert_eq!(store.list_bookings(&staff.token).await.unwrap().len(), 1);

        let err = store.cancel_booking(&bob.token, booking.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        store.cancel_booking(&staff.token, booking.id).await.unwrap();

        let listed = store.list_bookings(&alice.token).await.unwrap();
        assert_eq!(listed[0].status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn staff_books_on_behalf_of_a_customer() {
        let store = InMemoryHotelStore::new();
        let room = store
            .seed_room(RoomDraft::new("101", "single", Money::from_units(40)))
            .await
            .unwrap();
        let staff = store.issue_staff_token("desk").await;
        let customer = store
            .create_customer(&staff.token, CustomerDraft::new("Walk In", "0722", "NID-W"))
            .await
            .unwrap();

        let booking = store
            .create_booking(
                &staff.token,
                BookingRequest::on_behalf_of(room.id, customer.id, DateRange::new(jan(4), jan(6))),
            )
            .await
            .unwrap();
        assert_eq!(booking.customer, customer.id);
        assert_eq!(booking.customer_name, "Walk In");
        assert!(booking.payment.is_none());

        let customers = store.list_customers(&staff.token).await.unwrap();
        assert_eq!(customers[0].total_bookings, 1);
        assert_eq!(customers[0].booking_history[0].id, booking.id);
    }
}

mod uniqueness {
    use super::*;

    #[tokio::test]
    async fn duplicate_national_id_names_the_field() {
        let store = InMemoryHotelStore::new();
        guest(&store, "first", "NID-1").await;

        let err = store
            .register(Registration {
                username: "second".into(),
                name: "Second".into(),
                phone: "0799".into(),
                national_id: "NID-1".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::field("national_id", "Customer with this national id already exists.")
        );

        let staff = store.issue_staff_token("desk").await;
        let err = store
            .create_customer(&staff.token, CustomerDraft::new("Third", "0788", "NID-1"))
            .await
            .unwrap_err();
        let booking_err: domain::BookingError = err.into();
        assert_eq!(booking_err.field_name(), Some("national_id"));
    }

    #[tokio::test]
    async fn updating_a_customer_keeps_own_national_id() {
        let store = InMemoryHotelStore::new();
        let staff = store.issue_staff_token("desk").await;
        let customer = store
            .create_customer(&staff.token, CustomerDraft::new("Old", "0700", "NID-1"))
            .await
            .unwrap();

        let updated = store
            .update_customer(
                &staff.token,
                customer.id,
                CustomerPatch::replace_with(CustomerDraft::new("New", "0700", "NID-1")),
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "New");
    }

    #[tokio::test]
    async fn duplicate_room_number_is_refused() {
        let store = InMemoryHotelStore::new();
        let staff = store.issue_staff_token("desk").await;
        store
            .create_room(&staff.token, RoomDraft::new("101", "single", Money::from_units(40)))
            .await
            .unwrap();
        let other = store
            .create_room(&staff.token, RoomDraft::new("102", "single", Money::from_units(40)))
            .await
            .unwrap();

        let err = store
            .update_room(
                &staff.token,
                other.id,
                RoomPatch {
                    room_number: Some("101".into()),
                    ..RoomPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Fields(_)));
    }
}

mod ledger {
    use super::*;

    #[tokio::test]
    async fn booking_and_cancellation_are_recorded() {
        let store = InMemoryHotelStore::new();
        let room = store
            .seed_room(RoomDraft::new("7", "suite", Money::from_units(200)))
            .await
            .unwrap();
        let grant = guest(&store, "amina", "NID-A").await;
        let staff = store.issue_staff_token("desk").await;

        let booking = store
            .create_booking(&grant.token, self_booking(room.id, DateRange::new(jan(1), jan(3))))
            .await
            .unwrap();
        store.cancel_booking(&grant.token, booking.id).await.unwrap();

        let entries = store.list_transactions(&staff.token).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].transaction_type, TransactionType::Cancellation);
        assert_eq!(entries[0].amount, Money::from_units(-400));
        assert_eq!(entries[1].amount, Money::from_units(400));
        assert!(entries[1].notes.ends_with("| payment: mobile_money (MM-20250101000000-1111)"));

        let err = store.list_transactions(&grant.token).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));
    }

    #[tokio::test]
    async fn deleting_a_room_removes_its_bookings() {
        let store = InMemoryHotelStore::new();
        let room = store
            .seed_room(RoomDraft::new("7", "suite", Money::from_units(200)))
            .await
            .unwrap();
        let grant = guest(&store, "amina", "NID-A").await;
        let staff = store.issue_staff_token("desk").await;
        store
            .create_booking(&grant.token, self_booking(room.id, DateRange::new(jan(1), jan(3))))
            .await
            .unwrap();

        store.delete_room(&staff.token, room.id).await.unwrap();
        assert_eq!(store.booking_count().await, 0);
        assert!(store.list_rooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_price_is_refused_before_anything_is_stored() {
        let store = InMemoryHotelStore::new();
        let err = store
            .seed_room(RoomDraft::new("9", "suite", Money::from_cents(9_000_000_000_000_000)))
            .await
            .unwrap_err();
        match err {
            StoreError::Fields(fields) => assert!(fields.contains_key("price")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.list_rooms().await.unwrap().is_empty());
        assert_eq!(store.booking_count().await, 0);
    }

    #[tokio::test]
    async fn long_stay_at_top_rate_is_charged_exactly() {
        let store = InMemoryHotelStore::new();
        let room = store
            .seed_room(RoomDraft::new("9", "suite", MAX_ROOM_PRICE))
            .await
            .unwrap();
        let grant = guest(&store, "amina", "NID-A").await;
        let staff = store.issue_staff_token("desk").await;
        let stay = DateRange::new(jan(1), NaiveDate::from_ymd_opt(9999, 12, 31).unwrap());

        let booking = store
            .create_booking(&grant.token, self_booking(room.id, stay))
            .await
            .unwrap();
        assert_eq!(store.booking_count().await, 1);

        let entries = store.list_transactions(&staff.token).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].booking, Some(booking.id));
        assert_eq!(entries[0].amount, MAX_ROOM_PRICE.times(stay.nights()));
        assert!(entries[0].amount > MAX_ROOM_PRICE);

        store.cancel_booking(&grant.token, booking.id).await.unwrap();
        let entries = store.list_transactions(&staff.token).await.unwrap();
        assert_eq!(entries[0].amount, -MAX_ROOM_PRICE.times(stay.nights()));
    }
}
