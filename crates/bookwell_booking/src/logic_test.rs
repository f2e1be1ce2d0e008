#[cfg(test)]
mod tests {
    use crate::logic::{
        validate_booking_window, validate_slot_shape, validate_within_availability, BookingError,
        SlotRequest,
    };
    use bookwell_common::models::{BookingSettings, DateOverride, WeeklyRule};
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
    use uuid::Uuid;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn settings() -> BookingSettings {
        BookingSettings {
            practitioner_id: Uuid::new_v4(),
            slot_duration_minutes: 60,
            buffer_minutes: 15,
            min_booking_notice_hours: 24,
            max_booking_days_ahead: 30,
            timezone: "Europe/Zurich".to_string(),
            requires_approval: false,
        }
    }

    fn request(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> SlotRequest {
        SlotRequest {
            practitioner_id: Uuid::new_v4(),
            date,
            start_time: start,
            end_time: end,
            client_name: "Ada Client".to_string(),
            client_email: "ada@example.com".to_string(),
            notes: None,
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
    }

    #[test]
    fn test_slot_shape_checks() {
        let settings = settings();

        assert!(validate_slot_shape(&request(monday(), time(10, 0), time(11, 0)), &settings).is_ok());

        // inverted
        assert!(matches!(
            validate_slot_shape(&request(monday(), time(11, 0), time(10, 0)), &settings),
            Err(BookingError::ValidationError(_))
        ));

        // wrong duration
        assert!(matches!(
            validate_slot_shape(&request(monday(), time(10, 0), time(10, 30)), &settings),
            Err(BookingError::ValidationError(_))
        ));

        // missing contact details
        let mut nameless = request(monday(), time(10, 0), time(11, 0));
        nameless.client_name = "  ".to_string();
        assert!(validate_slot_shape(&nameless, &settings).is_err());
    }

    #[test]
    fn test_booking_window_notice() {
        let settings = settings();
        // Monday 10:00 Zurich is 08:00 UTC; 24h notice from Sunday 07:00 UTC
        // ends Monday 07:00 UTC, so the slot clears it
        let now = Utc.with_ymd_and_hms(2025, 5, 4, 7, 0, 0).unwrap();
        assert!(
            validate_booking_window(&request(monday(), time(10, 0), time(11, 0)), &settings, now)
                .is_ok()
        );

        // two hours later the cutoff has passed the slot
        let too_late = now + chrono::Duration::hours(2);
        assert!(matches!(
            validate_booking_window(
                &request(monday(), time(10, 0), time(11, 0)),
                &settings,
                too_late
            ),
            Err(BookingError::ValidationError(_))
        ));
    }

    #[test]
    fn test_booking_window_horizon() {
        let settings = settings();
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();

        // 30 days from May 1 is May 31; June 2 is out of range
        let far = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert!(matches!(
            validate_booking_window(&request(far, time(10, 0), time(11, 0)), &settings, now),
            Err(BookingError::ValidationError(_))
        ));

        let near = NaiveDate::from_ymd_opt(2025, 5, 30).unwrap();
        assert!(
            validate_booking_window(&request(near, time(10, 0), time(11, 0)), &settings, now)
                .is_ok()
        );
    }

    #[test]
    fn test_availability_check_against_weekly_rules() {
        let rules = [WeeklyRule {
            day_of_week: 0,
            start_time: time(9, 0),
            end_time: time(17, 0),
            active: true,
        }];

        assert!(validate_within_availability(
            &request(monday(), time(10, 0), time(11, 0)),
            &rules,
            &[]
        )
        .is_ok());

        // ends outside the window
        assert!(matches!(
            validate_within_availability(
                &request(monday(), time(16, 30), time(17, 30)),
                &rules,
                &[]
            ),
            Err(BookingError::SlotNoLongerAvailable)
        ));

        // Tuesday has no rule at all
        let tuesday = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();
        assert!(matches!(
            validate_within_availability(&request(tuesday, time(10, 0), time(11, 0)), &rules, &[]),
            Err(BookingError::SlotNoLongerAvailable)
        ));
    }

    #[test]
    fn test_availability_check_respects_override() {
        let rules = [WeeklyRule {
            day_of_week: 0,
            start_time: time(9, 0),
            end_time: time(17, 0),
            active: true,
        }];
        let blocked = [DateOverride {
            date: monday(),
            is_available: false,
            start_time: None,
            end_time: None,
            reason: None,
        }];

        // a date blocked by override rejects a slot the weekly rule would allow
        assert!(matches!(
            validate_within_availability(
                &request(monday(), time(10, 0), time(11, 0)),
                &rules,
                &blocked
            ),
            Err(BookingError::SlotNoLongerAvailable)
        ));

        // an available override replaces the weekly window entirely
        let narrowed = [DateOverride {
            date: monday(),
            is_available: true,
            start_time: Some(time(13, 0)),
            end_time: Some(time(15, 0)),
            reason: None,
        }];
        assert!(matches!(
            validate_within_availability(
                &request(monday(), time(10, 0), time(11, 0)),
                &rules,
                &narrowed
            ),
            Err(BookingError::SlotNoLongerAvailable)
        ));
        assert!(validate_within_availability(
            &request(monday(), time(13, 0), time(14, 0)),
            &rules,
            &narrowed
        )
        .is_ok());
    }
}
