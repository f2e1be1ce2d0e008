#[cfg(test)]
mod tests {
    use crate::schedule::{validate_override, validate_settings, validate_weekly_schedule};
    use bookwell_common::models::{BookingSettings, DateOverride, WeeklyRule};
    use chrono::{NaiveDate, NaiveTime};
    use uuid::Uuid;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn rule(day: u8, start: NaiveTime, end: NaiveTime) -> WeeklyRule {
        WeeklyRule {
            day_of_week: day,
            start_time: start,
            end_time: end,
            active: true,
        }
    }

    #[test]
    fn test_valid_week_passes() {
        let rules = vec![
            rule(0, time(9, 0), time(12, 0)),
            rule(0, time(13, 0), time(17, 0)),
            rule(2, time(9, 0), time(17, 0)),
        ];
        assert!(validate_weekly_schedule(&rules).is_ok());
    }

    #[test]
    fn test_overlapping_rules_on_same_day_rejected() {
        let rules = vec![
            rule(0, time(9, 0), time(13, 0)),
            rule(0, time(12, 0), time(17, 0)),
        ];
        assert!(validate_weekly_schedule(&rules).is_err());
    }

    #[test]
    fn test_overlap_on_different_days_is_fine() {
        let rules = vec![
            rule(0, time(9, 0), time(13, 0)),
            rule(1, time(12, 0), time(17, 0)),
        ];
        assert!(validate_weekly_schedule(&rules).is_ok());
    }

    #[test]
    fn test_inactive_rules_do_not_count_as_overlap() {
        let mut sleeping = rule(0, time(9, 0), time(13, 0));
        sleeping.active = false;
        let rules = vec![sleeping, rule(0, time(12, 0), time(17, 0))];
        assert!(validate_weekly_schedule(&rules).is_ok());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let rules = vec![rule(0, time(17, 0), time(9, 0))];
        assert!(validate_weekly_schedule(&rules).is_err());
    }

    #[test]
    fn test_out_of_range_weekday_rejected() {
        let rules = vec![rule(7, time(9, 0), time(17, 0))];
        assert!(validate_weekly_schedule(&rules).is_err());
    }

    #[test]
    fn test_blocking_override_needs_no_times() {
        let entry = DateOverride {
            date: NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
            is_available: false,
            start_time: None,
            end_time: None,
            reason: None,
        };
        assert!(validate_override(&entry).is_ok());
    }

    #[test]
    fn test_available_override_requires_both_times() {
        let mut entry = DateOverride {
            date: NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
            is_available: true,
            start_time: Some(time(9, 0)),
            end_time: None,
            reason: None,
        };
        assert!(validate_override(&entry).is_err());

        entry.end_time = Some(time(17, 0));
        assert!(validate_override(&entry).is_ok());

        entry.end_time = Some(time(8, 0));
        assert!(validate_override(&entry).is_err(), "inverted override window");
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = BookingSettings {
            practitioner_id: Uuid::new_v4(),
            slot_duration_minutes: 45,
            buffer_minutes: 10,
            min_booking_notice_hours: 12,
            max_booking_days_ahead: 60,
            timezone: "America/New_York".to_string(),
            requires_approval: true,
        };
        assert!(validate_settings(&settings).is_ok());

        settings.slot_duration_minutes = 0;
        assert!(validate_settings(&settings).is_err());
        settings.slot_duration_minutes = 45;

        settings.buffer_minutes = -5;
        assert!(validate_settings(&settings).is_err());
        settings.buffer_minutes = 10;

        settings.timezone = "Not/AZone".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
