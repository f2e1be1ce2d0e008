// --- File: crates/bookwell_availability/src/schedule.rs ---
//! Schedule editing: weekly rules, date overrides and booking settings.
//!
//! The weekly editor has replace-all-on-save semantics. Validation happens
//! here, before the transactional replace, and is the enforcement point of
//! the no-overlapping-rules invariant; the slot generator relies on it and
//! does not de-duplicate.

use crate::logic::AvailabilityError;
use bookwell_common::models::{BookingSettings, DateOverride, WeeklyRule};
use bookwell_common::time::MinuteSpan;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReplaceScheduleRequest {
    /// The full week. Anything previously saved and not present here is gone.
    pub rules: Vec<WeeklyRule>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ScheduleResponse {
    pub rules: Vec<WeeklyRule>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OverridesResponse {
    pub overrides: Vec<DateOverride>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateSettingsRequest {
    pub slot_duration_minutes: i64,
    pub buffer_minutes: i64,
    pub min_booking_notice_hours: i64,
    pub max_booking_days_ahead: i64,
    pub timezone: String,
    pub requires_approval: bool,
}

/// Validate a full weekly schedule before the transactional replace.
///
/// Rejects out-of-range weekdays, inverted windows and overlapping active
/// rules on the same day.
pub fn validate_weekly_schedule(rules: &[WeeklyRule]) -> Result<(), AvailabilityError> {
    for rule in rules {
        if rule.day_of_week > 6 {
            return Err(AvailabilityError::ValidationError(format!(
                "day_of_week must be 0-6, got {}",
                rule.day_of_week
            )));
        }
        if rule.start_time >= rule.end_time {
            return Err(AvailabilityError::ValidationError(format!(
                "Rule on day {} has start {} at or after end {}",
                rule.day_of_week, rule.start_time, rule.end_time
            )));
        }
    }

    for day in 0..7u8 {
        let mut spans: Vec<MinuteSpan> = rules
            .iter()
            .filter(|r| r.active && r.day_of_week == day)
            .filter_map(|r| MinuteSpan::from_times(r.start_time, r.end_time))
            .collect();
        spans.sort_by_key(|s| s.start);
        for pair in spans.windows(2) {
            if pair[0].overlaps(&pair[1]) {
                return Err(AvailabilityError::ValidationError(format!(
                    "Overlapping rules on day {day}"
                )));
            }
        }
    }

    Ok(())
}

/// Validate a date override. An available override must carry both times;
/// missing times are rejected, never defaulted.
pub fn validate_override(entry: &DateOverride) -> Result<(), AvailabilityError> {
    if !entry.is_available {
        return Ok(());
    }
    match (entry.start_time, entry.end_time) {
        (Some(start), Some(end)) if start < end => Ok(()),
        (Some(_), Some(_)) => Err(AvailabilityError::ValidationError(format!(
            "Override for {} has start at or after end",
            entry.date
        ))),
        _ => Err(AvailabilityError::ValidationError(format!(
            "Available override for {} requires start and end times",
            entry.date
        ))),
    }
}

/// Validate booking settings before the upsert.
pub fn validate_settings(settings: &BookingSettings) -> Result<(), AvailabilityError> {
    if settings.slot_duration_minutes <= 0 {
        return Err(AvailabilityError::ValidationError(
            "slot_duration_minutes must be positive".to_string(),
        ));
    }
    if settings.buffer_minutes < 0 {
        return Err(AvailabilityError::ValidationError(
            "buffer_minutes must not be negative".to_string(),
        ));
    }
    if settings.min_booking_notice_hours < 0 {
        return Err(AvailabilityError::ValidationError(
            "min_booking_notice_hours must not be negative".to_string(),
        ));
    }
    if settings.max_booking_days_ahead <= 0 {
        return Err(AvailabilityError::ValidationError(
            "max_booking_days_ahead must be positive".to_string(),
        ));
    }
    settings
        .tz()
        .map(|_| ())
        .map_err(|e| AvailabilityError::ValidationError(e.to_string()))
}
