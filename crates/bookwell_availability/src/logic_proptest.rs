#[cfg(test)]
mod tests {
    use crate::logic::{compute_available_slots, SlotInputs};
    use bookwell_common::models::{BookingSettings, BusyInterval, WeeklyRule};
    use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;

    // Fixed anchor: Thursday 2025-05-01, noon UTC
    fn base_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    fn settings(duration: i64, buffer: i64, notice: i64) -> BookingSettings {
        BookingSettings {
            practitioner_id: Uuid::new_v4(),
            slot_duration_minutes: duration,
            buffer_minutes: buffer,
            min_booking_notice_hours: notice,
            max_booking_days_ahead: 60,
            timezone: "Europe/Zurich".to_string(),
            requires_approval: false,
        }
    }

    fn full_week(start_hour: u32, end_hour: u32) -> Vec<WeeklyRule> {
        (0..7)
            .map(|day| WeeklyRule {
                day_of_week: day,
                start_time: NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(end_hour, 0, 0).unwrap(),
                active: true,
            })
            .collect()
    }

    fn busy_periods(count: usize, gap_hours: i64, len_hours: i64) -> Vec<BusyInterval> {
        let mut out = Vec::new();
        let mut cursor = base_now() + Duration::hours(20);
        for _ in 0..count {
            let start = cursor + Duration::hours(gap_hours);
            let end = start + Duration::hours(len_hours.max(1));
            out.push(BusyInterval {
                provider: "google".to_string(),
                start,
                end,
            });
            cursor = end;
        }
        out
    }

    proptest! {
        // No generated slot may overlap a busy interval expanded by the buffer
        #[test]
        fn test_slots_never_overlap_expanded_busy_periods(
            duration_minutes in 15..120i64,
            buffer_minutes in 0..30i64,
            busy_count in 0..5usize,
            busy_gap_hours in 1..6i64,
            busy_len_hours in 1..4i64,
        ) {
            let settings = settings(duration_minutes, buffer_minutes, 0);
            let rules = full_week(8, 18);
            let busy = busy_periods(busy_count, busy_gap_hours, busy_len_hours);
            let inputs = SlotInputs {
                settings: &settings,
                rules: &rules,
                overrides: &[],
                busy: &busy,
                appointments: &[],
            };

            let from = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
            let to = NaiveDate::from_ymd_opt(2025, 5, 8).unwrap();
            let slots = compute_available_slots(&inputs, from, to, base_now()).unwrap();

            let buffer = Duration::minutes(buffer_minutes);
            for (slot_start, slot_end) in &slots {
                let start = slot_start.with_timezone(&Utc);
                let end = slot_end.with_timezone(&Utc);
                for interval in &busy {
                    let blocked_start = interval.start - buffer;
                    let blocked_end = interval.end + buffer;
                    prop_assert!(
                        end <= blocked_start || start >= blocked_end,
                        "Slot {:?}-{:?} overlaps busy {:?}-{:?} (buffer {}m)",
                        start, end, interval.start, interval.end, buffer_minutes
                    );
                }
            }
        }

        // Every slot respects the booking-notice cutoff
        #[test]
        fn test_slots_respect_min_notice(
            duration_minutes in 15..120i64,
            notice_hours in 0..96i64,
        ) {
            let settings = settings(duration_minutes, 0, notice_hours);
            let rules = full_week(8, 18);
            let inputs = SlotInputs {
                settings: &settings,
                rules: &rules,
                overrides: &[],
                busy: &[],
                appointments: &[],
            };

            let from = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
            let to = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
            let slots = compute_available_slots(&inputs, from, to, base_now()).unwrap();

            let cutoff = base_now() + Duration::hours(notice_hours);
            for (slot_start, _) in &slots {
                prop_assert!(
                    slot_start.with_timezone(&Utc) >= cutoff,
                    "Slot {:?} starts before now + {}h notice",
                    slot_start, notice_hours
                );
            }
        }

        // Slots are chronological and the function is a pure function of its inputs
        #[test]
        fn test_slots_ordered_and_idempotent(
            duration_minutes in 15..120i64,
            buffer_minutes in 0..30i64,
            busy_count in 0..4usize,
        ) {
            let settings = settings(duration_minutes, buffer_minutes, 12);
            let rules = full_week(9, 17);
            let busy = busy_periods(busy_count, 2, 1);
            let inputs = SlotInputs {
                settings: &settings,
                rules: &rules,
                overrides: &[],
                busy: &busy,
                appointments: &[],
            };

            let from = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
            let to = NaiveDate::from_ymd_opt(2025, 5, 9).unwrap();
            let first = compute_available_slots(&inputs, from, to, base_now()).unwrap();
            let second = compute_available_slots(&inputs, from, to, base_now()).unwrap();

            prop_assert_eq!(&first, &second);
            for pair in first.windows(2) {
                prop_assert!(pair[0].0 < pair[1].0);
            }
        }

        // Slot length always equals the configured duration
        #[test]
        fn test_slot_length_matches_duration(
            duration_minutes in 15..180i64,
        ) {
            let settings = settings(duration_minutes, 0, 0);
            let rules = full_week(8, 20);
            let inputs = SlotInputs {
                settings: &settings,
                rules: &rules,
                overrides: &[],
                busy: &[],
                appointments: &[],
            };

            let from = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
            let to = NaiveDate::from_ymd_opt(2025, 5, 4).unwrap();
            let slots = compute_available_slots(&inputs, from, to, base_now()).unwrap();

            for (start, end) in &slots {
                prop_assert_eq!((*end - *start).num_minutes(), duration_minutes);
            }
        }
    }
}
