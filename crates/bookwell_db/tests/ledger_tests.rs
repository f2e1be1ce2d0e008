//! Ledger repository tests against a throwaway sqlite database.
//!
//! These exercise the storage-level guarantees the rest of the system leans
//! on: the guarded insert admits exactly one of two overlapping writes, and
//! reminder stamps are set at most once.

use bookwell_common::models::{
    AppointmentKind, AppointmentStatus, BookingSettings, CalendarLink, DateOverride, ReminderKind,
    RsvpStatus, WeeklyRule,
};
use bookwell_db::{
    AvailabilityRepository, BusyCacheRepository, DbClient, LedgerRepository, NewAppointment,
    Repositories,
};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

async fn test_repos() -> Repositories {
    let path = std::env::temp_dir().join(format!("bookwell-test-{}.db", Uuid::new_v4()));
    let client = DbClient::from_url(&format!("sqlite://{}", path.display()))
        .await
        .expect("sqlite test database should open");
    Repositories::init(client)
        .await
        .expect("schema init should succeed")
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn candidate(
    practitioner_id: Uuid,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    status: AppointmentStatus,
) -> NewAppointment {
    let kind = if status == AppointmentStatus::Scheduled {
        AppointmentKind::Session
    } else {
        AppointmentKind::Booking
    };
    NewAppointment {
        id: Uuid::new_v4(),
        practitioner_id,
        kind,
        date,
        start_time: start,
        end_time: end,
        status,
        rsvp_status: (kind == AppointmentKind::Session).then_some(RsvpStatus::Pending),
        client_name: "Ada Client".to_string(),
        client_email: "ada@example.com".to_string(),
        notes: None,
        created_at: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_guarded_insert_rejects_overlap() {
    let repos = test_repos().await;
    let practitioner = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();

    repos
        .ledger
        .insert_if_free(candidate(
            practitioner,
            date,
            time(10, 0),
            time(11, 0),
            AppointmentStatus::Confirmed,
        ))
        .await
        .expect("first insert should succeed");

    // partially overlapping
    let err = repos
        .ledger
        .insert_if_free(candidate(
            practitioner,
            date,
            time(10, 30),
            time(11, 30),
            AppointmentStatus::PendingVerification,
        ))
        .await
        .expect_err("overlapping insert must fail");
    assert!(matches!(err, bookwell_db::DbError::Conflict(_)));

    // back-to-back is not an overlap
    repos
        .ledger
        .insert_if_free(candidate(
            practitioner,
            date,
            time(11, 0),
            time(12, 0),
            AppointmentStatus::Confirmed,
        ))
        .await
        .expect("adjacent slot should insert");
}

#[tokio::test]
async fn test_unverified_booking_still_blocks() {
    let repos = test_repos().await;
    let practitioner = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();

    repos
        .ledger
        .insert_if_free(candidate(
            practitioner,
            date,
            time(9, 0),
            time(10, 0),
            AppointmentStatus::PendingVerification,
        ))
        .await
        .expect("unverified booking should insert");

    let err = repos
        .ledger
        .insert_if_free(candidate(
            practitioner,
            date,
            time(9, 0),
            time(10, 0),
            AppointmentStatus::PendingVerification,
        ))
        .await
        .expect_err("second unverified request for the slot must fail");
    assert!(matches!(err, bookwell_db::DbError::Conflict(_)));
}

#[tokio::test]
async fn test_cancelled_rows_stop_blocking() {
    let repos = test_repos().await;
    let practitioner = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();

    let booked = repos
        .ledger
        .insert_if_free(candidate(
            practitioner,
            date,
            time(10, 0),
            time(11, 0),
            AppointmentStatus::Confirmed,
        ))
        .await
        .unwrap();

    repos
        .ledger
        .transition_status(
            booked.id,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
        )
        .await
        .expect("cancel should succeed");

    repos
        .ledger
        .insert_if_free(candidate(
            practitioner,
            date,
            time(10, 0),
            time(11, 0),
            AppointmentStatus::Confirmed,
        ))
        .await
        .expect("slot freed by cancellation should be bookable again");
}

#[tokio::test]
async fn test_concurrent_inserts_one_winner() {
    let repos = test_repos().await;
    let practitioner = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();

    let first = candidate(
        practitioner,
        date,
        time(14, 0),
        time(15, 0),
        AppointmentStatus::PendingVerification,
    );
    let second = candidate(
        practitioner,
        date,
        time(14, 0),
        time(15, 0),
        AppointmentStatus::PendingVerification,
    );

    let ledger_a = repos.ledger.clone();
    let ledger_b = repos.ledger.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { ledger_a.insert_if_free(first).await }),
        tokio::spawn(async move { ledger_b.insert_if_free(second).await }),
    );
    let results = [a.unwrap(), b.unwrap()];

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one concurrent insert must win");

    let blocking = repos
        .ledger
        .list_blocking(practitioner, date, date)
        .await
        .unwrap();
    assert_eq!(blocking.len(), 1, "no overlapping blocking rows may remain");
}

#[tokio::test]
async fn test_transition_requires_expected_state() {
    let repos = test_repos().await;
    let practitioner = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();

    let booking = repos
        .ledger
        .insert_if_free(candidate(
            practitioner,
            date,
            time(10, 0),
            time(11, 0),
            AppointmentStatus::PendingVerification,
        ))
        .await
        .unwrap();

    let confirmed = repos
        .ledger
        .transition_status(
            booking.id,
            AppointmentStatus::PendingVerification,
            AppointmentStatus::Confirmed,
        )
        .await
        .unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    // verifying twice must fail: the row is no longer pending
    let err = repos
        .ledger
        .transition_status(
            booking.id,
            AppointmentStatus::PendingVerification,
            AppointmentStatus::Confirmed,
        )
        .await
        .expect_err("double verification must fail");
    assert!(matches!(err, bookwell_db::DbError::NotFound(_)));
}

#[tokio::test]
async fn test_reminder_stamp_set_at_most_once() {
    let repos = test_repos().await;
    let practitioner = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();

    let session = repos
        .ledger
        .insert_if_free(candidate(
            practitioner,
            date,
            time(10, 0),
            time(11, 0),
            AppointmentStatus::Scheduled,
        ))
        .await
        .unwrap();

    let at = Utc.with_ymd_and_hms(2025, 5, 4, 10, 0, 0).unwrap();
    assert!(repos
        .ledger
        .stamp_reminder(session.id, ReminderKind::Session24h, at)
        .await
        .unwrap());
    assert!(
        !repos
            .ledger
            .stamp_reminder(session.id, ReminderKind::Session24h, at)
            .await
            .unwrap(),
        "second stamp of the same kind must be a no-op"
    );

    let reloaded = repos.ledger.find_by_id(session.id).await.unwrap().unwrap();
    assert_eq!(reloaded.session_24h_sent_at, Some(at));
    assert_eq!(reloaded.session_1h_sent_at, None);
}

#[tokio::test]
async fn test_proposal_flow_and_guarded_accept() {
    let repos = test_repos().await;
    let practitioner = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();

    let session = repos
        .ledger
        .insert_if_free(candidate(
            practitioner,
            date,
            time(10, 0),
            time(11, 0),
            AppointmentStatus::Scheduled,
        ))
        .await
        .unwrap();

    // a confirmed booking occupies the proposed target time
    repos
        .ledger
        .insert_if_free(candidate(
            practitioner,
            date,
            time(15, 0),
            time(16, 0),
            AppointmentStatus::Confirmed,
        ))
        .await
        .unwrap();

    repos
        .ledger
        .store_proposal(session.id, date, time(15, 30), time(16, 30), None)
        .await
        .unwrap();
    let stored = repos.ledger.find_by_id(session.id).await.unwrap().unwrap();
    assert_eq!(stored.rsvp_status, Some(RsvpStatus::RescheduleRequested));
    assert_eq!(stored.proposed_start_time, Some(time(15, 30)));

    // accept against an occupied time: conflict, session unchanged
    let err = repos
        .ledger
        .accept_proposal(session.id, date, time(15, 30), time(16, 30))
        .await
        .expect_err("accept into an occupied window must fail");
    assert!(matches!(err, bookwell_db::DbError::Conflict(_)));
    let unchanged = repos.ledger.find_by_id(session.id).await.unwrap().unwrap();
    assert_eq!(unchanged.start_time, time(10, 0));

    // accept against a free time: session moves, proposal cleared
    let moved = repos
        .ledger
        .accept_proposal(session.id, date, time(17, 0), time(18, 0))
        .await
        .unwrap();
    assert_eq!(moved.start_time, time(17, 0));
    assert_eq!(moved.rsvp_status, Some(RsvpStatus::Accepted));
    assert_eq!(moved.proposed_date, None);
    assert_eq!(moved.session_24h_sent_at, None);
}

#[tokio::test]
async fn test_decline_proposal_returns_rsvp_to_pending() {
    let repos = test_repos().await;
    let practitioner = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();

    let session = repos
        .ledger
        .insert_if_free(candidate(
            practitioner,
            date,
            time(10, 0),
            time(11, 0),
            AppointmentStatus::Scheduled,
        ))
        .await
        .unwrap();

    repos
        .ledger
        .store_proposal(
            session.id,
            date,
            time(15, 0),
            time(16, 0),
            Some("later works better".to_string()),
        )
        .await
        .unwrap();
    repos.ledger.decline_proposal(session.id).await.unwrap();

    let reloaded = repos.ledger.find_by_id(session.id).await.unwrap().unwrap();
    assert_eq!(reloaded.rsvp_status, Some(RsvpStatus::Pending));
    assert_eq!(reloaded.proposed_date, None);
    assert_eq!(reloaded.start_time, time(10, 0), "time must be unchanged");
}

#[tokio::test]
async fn test_weekly_schedule_replace_all() {
    let repos = test_repos().await;
    let practitioner = Uuid::new_v4();

    let monday = WeeklyRule {
        day_of_week: 0,
        start_time: time(9, 0),
        end_time: time(17, 0),
        active: true,
    };
    let tuesday = WeeklyRule {
        day_of_week: 1,
        start_time: time(10, 0),
        end_time: time(14, 0),
        active: true,
    };
    repos
        .availability
        .replace_weekly_schedule(practitioner, &[monday.clone(), tuesday])
        .await
        .unwrap();

    // saving again with a single rule must not leave tuesday behind
    repos
        .availability
        .replace_weekly_schedule(practitioner, &[monday.clone()])
        .await
        .unwrap();
    let rules = repos
        .availability
        .list_weekly_rules(practitioner)
        .await
        .unwrap();
    assert_eq!(rules, vec![monday]);
}

#[tokio::test]
async fn test_override_upsert_by_date() {
    let repos = test_repos().await;
    let practitioner = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();

    repos
        .availability
        .upsert_override(
            practitioner,
            DateOverride {
                date,
                is_available: false,
                start_time: None,
                end_time: None,
                reason: Some("conference".to_string()),
            },
        )
        .await
        .unwrap();

    // same date again: update, not a second row
    repos
        .availability
        .upsert_override(
            practitioner,
            DateOverride {
                date,
                is_available: true,
                start_time: Some(time(12, 0)),
                end_time: Some(time(16, 0)),
                reason: None,
            },
        )
        .await
        .unwrap();

    let overrides = repos
        .availability
        .list_overrides(practitioner, date, date)
        .await
        .unwrap();
    assert_eq!(overrides.len(), 1);
    assert!(overrides[0].is_available);
    assert_eq!(overrides[0].start_time, Some(time(12, 0)));
}

#[tokio::test]
async fn test_busy_cache_full_replacement() {
    let repos = test_repos().await;
    let practitioner = Uuid::new_v4();

    let old = (
        Utc.with_ymd_and_hms(2025, 5, 5, 8, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0).unwrap(),
    );
    let new = (
        Utc.with_ymd_and_hms(2025, 5, 6, 8, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 5, 6, 9, 0, 0).unwrap(),
    );

    repos
        .busy_cache
        .replace_intervals(practitioner, "google", &[old])
        .await
        .unwrap();
    repos
        .busy_cache
        .replace_intervals(practitioner, "google", &[new])
        .await
        .unwrap();

    let cached = repos
        .busy_cache
        .list_busy(
            practitioner,
            Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 5, 31, 0, 0, 0).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(cached.len(), 1, "old sync batch must be fully replaced");
    assert_eq!(cached[0].start, new.0);
}

#[tokio::test]
async fn test_settings_and_calendar_links_round_trip() {
    let repos = test_repos().await;
    let practitioner = Uuid::new_v4();

    assert!(repos
        .availability
        .get_settings(practitioner)
        .await
        .unwrap()
        .is_none());

    let settings = BookingSettings {
        practitioner_id: practitioner,
        slot_duration_minutes: 60,
        buffer_minutes: 15,
        min_booking_notice_hours: 24,
        max_booking_days_ahead: 30,
        timezone: "Europe/Zurich".to_string(),
        requires_approval: false,
    };
    repos
        .availability
        .upsert_settings(settings.clone())
        .await
        .unwrap();
    assert_eq!(
        repos.availability.get_settings(practitioner).await.unwrap(),
        Some(settings)
    );

    let link = CalendarLink {
        provider: "google".to_string(),
        calendar_ref: "practice@example.com".to_string(),
    };
    repos
        .busy_cache
        .upsert_calendar_link(practitioner, link.clone())
        .await
        .unwrap();
    repos
        .busy_cache
        .upsert_calendar_link(practitioner, link.clone())
        .await
        .unwrap();
    assert_eq!(
        repos
            .busy_cache
            .list_calendar_links(practitioner)
            .await
            .unwrap(),
        vec![link]
    );
}
