//! The customer booking session and staff console driven over HTTP/JSON
//! through [`api::RouterClient`].

use chrono::NaiveDate;
use domain::{
    AuthSession, BookingError, BookingIntent, DateRange, ErrorKind, FixedClock, IntentSlot, Money,
    PaymentMethod, Registration, RoomDraft,
};
use session::{BookingStep, CustomerBookingSession, StaffConsole};
use store::{HotelStore, InMemoryHotelStore};

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

fn clock() -> FixedClock {
    FixedClock(jan(9).and_hms_opt(8, 15, 0).unwrap())
}

fn client(store: &InMemoryHotelStore) -> api::RouterClient {
    api::RouterClient::new(api::store_router(store.clone()))
}

fn registration(username: &str, national_id: &str) -> Registration {
    Registration {
        username: username.into(),
        name: username.to_uppercase(),
        phone: "0712000000".into(),
        national_id: national_id.into(),
    }
}

async fn signed_in(http: &api::RouterClient, username: &str, national_id: &str) -> AuthSession {
    AuthSession::signed_in(http.register(registration(username, national_id)).await.unwrap())
}

#[tokio::test]
async fn test_booking_flow_over_http() {
    let store = InMemoryHotelStore::with_clock(clock());
    let room = store
        .seed_room(RoomDraft::new("101", "double", Money::from_units(80)))
        .await
        .unwrap();
    let http = client(&store);

    let mut auth = signed_in(&http, "amina", "NID-1").await;
    let mut slot = IntentSlot::carrying(BookingIntent::new(room.id, DateRange::new(jan(10), jan(12))));
    let mut session = CustomerBookingSession::enter(http.clone(), &mut auth, &mut slot, clock())
        .await
        .unwrap();
    assert_eq!(session.selected_room(), Some(room.id));

    let BookingStep::AwaitingPayment(details) = session.book().await.unwrap() else {
        panic!("expected the payment step");
    };
    assert!(details.reference.is_well_formed());
    session
        .change_payment_method(PaymentMethod::BankTransfer)
        .unwrap();
    let BookingStep::Booked(booking) = session.book().await.unwrap() else {
        panic!("expected a booking");
    };
    assert!(
        booking
            .payment
            .as_ref()
            .unwrap()
            .reference
            .as_str()
            .starts_with("BT-")
    );
    assert!(session.available_rooms().is_empty());

    session.cancel_booking(booking.id).await.unwrap();
    assert_eq!(session.available_rooms()[0].id, room.id);
}

#[tokio::test]
async fn test_conflict_over_http_refreshes_availability() {
    let store = InMemoryHotelStore::with_clock(clock());
    let room = store
        .seed_room(RoomDraft::new("101", "double", Money::from_units(80)))
        .await
        .unwrap();
    let http = client(&store);
    let stay = DateRange::new(jan(10), jan(12));

    let mut first_auth = signed_in(&http, "first", "NID-1").await;
    let mut second_auth = signed_in(&http, "second", "NID-2").await;
    let mut first = CustomerBookingSession::enter(
        http.clone(),
        &mut first_auth,
        &mut IntentSlot::carrying(BookingIntent::new(room.id, stay)),
        clock(),
    )
    .await
    .unwrap();
    let mut second = CustomerBookingSession::enter(
        http.clone(),
        &mut second_auth,
        &mut IntentSlot::carrying(BookingIntent::new(room.id, stay)),
        clock(),
    )
    .await
    .unwrap();

    first.book().await.unwrap();
    second.book().await.unwrap();
    first.book().await.unwrap();

    let err = second.book().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(second.selected_room(), None);
    assert!(second.available_rooms().is_empty());
}

#[tokio::test]
async fn test_field_errors_survive_the_wire() {
    let store = InMemoryHotelStore::with_clock(clock());
    let http = client(&store);
    http.register(registration("amina", "NID-1")).await.unwrap();

    let err: BookingError = http
        .register(registration("copy", "NID-1"))
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.kind(), ErrorKind::Field);
    assert_eq!(err.field_name(), Some("national_id"));
}

#[tokio::test]
async fn test_staff_console_over_http() {
    let store = InMemoryHotelStore::with_clock(clock());
    let http = client(&store);
    let mut auth = AuthSession::signed_in(store.issue_staff_token("desk").await);

    let mut console = StaffConsole::load(http.clone(), &mut auth, &clock())
        .await
        .unwrap();
    let room = console
        .create_room(RoomDraft::new("201", "suite", Money::from_units(150)))
        .await
        .unwrap();
    let err = console
        .create_room(RoomDraft::new("201", "suite", Money::from_units(150)))
        .await
        .unwrap_err();
    assert_eq!(err.field_name(), Some("room_number"));

    let customer = console
        .create_customer(domain::CustomerDraft::new("Walk In", "0733", "NID-W"))
        .await
        .unwrap();
    console
        .book_for_customer(customer.id, room.id, DateRange::new(jan(9), jan(11)))
        .await
        .unwrap();
    assert_eq!(console.customers()[0].total_bookings, 1);
    assert!(console.available_rooms().is_empty());

    let ledger = console.transactions().await.unwrap();
    assert_eq!(ledger[0].amount, Money::from_units(300));
}

#[tokio::test]
async fn test_revoked_token_over_http_clears_the_session() {
    let store = InMemoryHotelStore::with_clock(clock());
    let http = client(&store);
    let grant = http.register(registration("amina", "NID-1")).await.unwrap();
    let token = grant.token.clone();
    let mut auth = AuthSession::signed_in(grant);
    let mut session =
        CustomerBookingSession::enter(http.clone(), &mut auth, &mut IntentSlot::empty(), clock())
            .await
            .unwrap();

    http.logout(&token).await.unwrap();
    let err = session.reload().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(!session.auth().is_authenticated());
}
