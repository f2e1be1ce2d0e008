//! End-to-end booking pipeline tests over a throwaway sqlite database:
//! window check, availability check, guarded insert and the verification
//! lifecycle, with a frozen clock.

use bookwell_booking::logic::{
    cancel_appointment, create_booking, create_session, update_session_status, verify_booking,
    BookingError, SlotRequest,
};
use bookwell_common::models::{AppointmentStatus, BookingSettings, WeeklyRule};
use bookwell_common::time::FixedClock;
use bookwell_db::{AvailabilityRepository, DbClient, Repositories};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
}

// Thursday before, so the 24h notice never bites for the Monday slots
fn frozen_clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap())
}

async fn setup() -> (Repositories, Uuid) {
    let path = std::env::temp_dir().join(format!("bookwell-booking-{}.db", Uuid::new_v4()));
    let client = DbClient::from_url(&format!("sqlite://{}", path.display()))
        .await
        .expect("sqlite test database should open");
    let repos = Repositories::init(client).await.expect("schema init");

    let practitioner = Uuid::new_v4();
    repos
        .availability
        .upsert_settings(BookingSettings {
            practitioner_id: practitioner,
            slot_duration_minutes: 60,
            buffer_minutes: 15,
            min_booking_notice_hours: 24,
            max_booking_days_ahead: 30,
            timezone: "Europe/Zurich".to_string(),
            requires_approval: false,
        })
        .await
        .unwrap();
    repos
        .availability
        .replace_weekly_schedule(
            practitioner,
            &[WeeklyRule {
                day_of_week: 0,
                start_time: time(9, 0),
                end_time: time(17, 0),
                active: true,
            }],
        )
        .await
        .unwrap();

    (repos, practitioner)
}

fn slot(practitioner: Uuid, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> SlotRequest {
    SlotRequest {
        practitioner_id: practitioner,
        date,
        start_time: start,
        end_time: end,
        client_name: "Ada Client".to_string(),
        client_email: "ada@example.com".to_string(),
        notes: None,
    }
}

#[tokio::test]
async fn test_booking_lifecycle() {
    let (repos, practitioner) = setup().await;
    let clock = frozen_clock();

    let booking = create_booking(
        &repos.availability,
        &repos.ledger,
        &clock,
        slot(practitioner, monday(), time(10, 0), time(11, 0)),
    )
    .await
    .expect("booking inside availability should succeed");
    assert_eq!(booking.status, AppointmentStatus::PendingVerification);

    // the same slot is now taken, verified or not
    let err = create_booking(
        &repos.availability,
        &repos.ledger,
        &clock,
        slot(practitioner, monday(), time(10, 0), time(11, 0)),
    )
    .await
    .expect_err("same slot twice must conflict");
    assert!(matches!(err, BookingError::SlotNoLongerAvailable));

    let confirmed = verify_booking(&repos.ledger, booking.id).await.unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    let err = verify_booking(&repos.ledger, booking.id)
        .await
        .expect_err("verification is one-shot");
    assert!(matches!(err, BookingError::NotFound(_)));
}

#[tokio::test]
async fn test_booking_outside_availability_is_rejected() {
    let (repos, practitioner) = setup().await;
    let clock = frozen_clock();

    // Tuesday has no weekly rule
    let tuesday = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();
    let err = create_booking(
        &repos.availability,
        &repos.ledger,
        &clock,
        slot(practitioner, tuesday, time(10, 0), time(11, 0)),
    )
    .await
    .expect_err("no availability window on tuesday");
    assert!(matches!(err, BookingError::SlotNoLongerAvailable));

    // within the Monday window but the wrong length
    let err = create_booking(
        &repos.availability,
        &repos.ledger,
        &clock,
        slot(practitioner, monday(), time(10, 0), time(10, 30)),
    )
    .await
    .expect_err("duration must match settings");
    assert!(matches!(err, BookingError::ValidationError(_)));
}

#[tokio::test]
async fn test_booking_notice_window_enforced() {
    let (repos, practitioner) = setup().await;
    // Sunday evening: less than 24h before the Monday 10:00 slot
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 5, 4, 20, 0, 0).unwrap());

    let err = create_booking(
        &repos.availability,
        &repos.ledger,
        &clock,
        slot(practitioner, monday(), time(10, 0), time(11, 0)),
    )
    .await
    .expect_err("notice window must reject late bookings");
    assert!(matches!(err, BookingError::ValidationError(_)));
}

#[tokio::test]
async fn test_unknown_practitioner_is_not_found() {
    let (repos, _) = setup().await;
    let clock = frozen_clock();

    let err = create_booking(
        &repos.availability,
        &repos.ledger,
        &clock,
        slot(Uuid::new_v4(), monday(), time(10, 0), time(11, 0)),
    )
    .await
    .expect_err("practitioner without settings");
    assert!(matches!(err, BookingError::NotFound(_)));
}

#[tokio::test]
async fn test_session_bypasses_published_hours_but_not_overlap() {
    let (repos, practitioner) = setup().await;
    let clock = frozen_clock();

    // Sessions may sit outside the published schedule
    let tuesday = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();
    let session = create_session(
        &repos.availability,
        &repos.ledger,
        &clock,
        slot(practitioner, tuesday, time(19, 0), time(20, 0)),
    )
    .await
    .expect("practitioner can schedule outside published hours");
    assert_eq!(session.status, AppointmentStatus::Scheduled);

    // but never on top of an existing blocking row
    let err = create_session(
        &repos.availability,
        &repos.ledger,
        &clock,
        slot(practitioner, tuesday, time(19, 30), time(20, 30)),
    )
    .await
    .expect_err("overlapping session must conflict");
    assert!(matches!(err, BookingError::SlotNoLongerAvailable));
}

#[tokio::test]
async fn test_cancellation_frees_the_slot() {
    let (repos, practitioner) = setup().await;
    let clock = frozen_clock();

    let booking = create_booking(
        &repos.availability,
        &repos.ledger,
        &clock,
        slot(practitioner, monday(), time(10, 0), time(11, 0)),
    )
    .await
    .unwrap();

    cancel_appointment(&repos.ledger, booking.id).await.unwrap();

    create_booking(
        &repos.availability,
        &repos.ledger,
        &clock,
        slot(practitioner, monday(), time(10, 0), time(11, 0)),
    )
    .await
    .expect("cancelled booking must free the slot");
}

#[tokio::test]
async fn test_session_terminal_transitions() {
    let (repos, practitioner) = setup().await;
    let clock = frozen_clock();

    let session = create_session(
        &repos.availability,
        &repos.ledger,
        &clock,
        slot(practitioner, monday(), time(9, 0), time(10, 0)),
    )
    .await
    .unwrap();

    let done = update_session_status(&repos.ledger, session.id, AppointmentStatus::Completed)
        .await
        .unwrap();
    assert_eq!(done.status, AppointmentStatus::Completed);

    // completed is terminal
    let err = update_session_status(&repos.ledger, session.id, AppointmentStatus::NoShow)
        .await
        .expect_err("completed is terminal");
    assert!(matches!(err, BookingError::ValidationError(_)));

    // a booking cannot take session states
    let booking = create_booking(
        &repos.availability,
        &repos.ledger,
        &clock,
        slot(practitioner, monday(), time(14, 0), time(15, 0)),
    )
    .await
    .unwrap();
    let err = update_session_status(&repos.ledger, booking.id, AppointmentStatus::Completed)
        .await
        .expect_err("bookings have no session states");
    assert!(matches!(err, BookingError::ValidationError(_)));
}
