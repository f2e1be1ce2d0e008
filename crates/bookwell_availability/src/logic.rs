// --- File: crates/bookwell_availability/src/logic.rs ---
//! Slot generation.
//!
//! `compute_available_slots` is a pure function over explicit inputs: the
//! practitioner's weekly rules, date overrides, cached busy intervals, the
//! blocking rows of the booking ledger, the booking settings and an injected
//! "now". Calling it twice with the same inputs yields the same output; all
//! I/O happens in the handler that assembles the inputs.

use bookwell_common::models::{
    Appointment, BookingSettings, BusyInterval, DateOverride, WeeklyRule,
};
use bookwell_common::time::{
    local_datetime, merge_spans, project_onto_local_date, subtract_spans, weekday_index,
    MinuteSpan,
};
use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Error Handling ---
use thiserror::Error;
#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Failed to parse time: {0}")]
    TimeParseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<AvailabilityError> for bookwell_common::BookwellError {
    fn from(err: AvailabilityError) -> Self {
        bookwell_common::BookwellError::ValidationError(err.to_string())
    }
}

// --- Data Structures ---
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AvailabilityQuery {
    /// Practitioner to compute slots for
    pub practitioner_id: Uuid,

    /// Start date in YYYY-MM-DD format
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-05-05"))]
    pub start_date: String,

    /// End date in YYYY-MM-DD format
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-05-24"))]
    pub end_date: String,
}

#[derive(Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailableSlot {
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-15T10:00:00+02:00"))]
    pub start_time: String, // RFC3339 in the practitioner's timezone
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-15T11:00:00+02:00"))]
    pub end_time: String,
    #[cfg_attr(feature = "openapi", schema(example = 60))]
    pub duration_minutes: i64,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailableSlotsResponse {
    pub slots: Vec<AvailableSlot>,
}

/// Everything slot generation reads, gathered by the caller.
#[derive(Debug)]
pub struct SlotInputs<'a> {
    pub settings: &'a BookingSettings,
    pub rules: &'a [WeeklyRule],
    pub overrides: &'a [DateOverride],
    pub busy: &'a [BusyInterval],
    pub appointments: &'a [Appointment],
}

// --- Availability Logic ---

/// Compute bookable slots for each date in `[from, to]`.
///
/// Per date: a date override wins wholesale (a blocked date yields no slots,
/// an available one replaces the weekly rules with its window); otherwise the
/// active weekly rules for that weekday supply the raw windows. Busy
/// intervals and blocking appointments, each expanded by the buffer and
/// clipped to the day, are subtracted, and every free sub-interval is
/// discretized from its start in steps of the slot duration. A slot is
/// emitted only when it fits entirely in the sub-interval and starts at or
/// after `now + min_booking_notice_hours`.
///
/// Overlapping weekly rules are not de-duplicated here; the schedule editor
/// rejects them at save time.
pub fn compute_available_slots(
    inputs: &SlotInputs<'_>,
    from: NaiveDate,
    to: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Vec<(DateTime<Tz>, DateTime<Tz>)>, AvailabilityError> {
    let settings = inputs.settings;
    let tz = settings
        .tz()
        .map_err(|e| AvailabilityError::ValidationError(e.to_string()))?;
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
    let duration = settings.slot_duration_minutes;
    let buffer = settings.buffer_minutes;

    // Clamp the range to [today, today + max_booking_days_ahead] in the
    // practitioner's frame; the notice cutoff trims individual slots below.
    let today = now.with_timezone(&tz).date_naive();
    let horizon = today
        .checked_add_days(Days::new(settings.max_booking_days_ahead.max(0) as u64))
        .unwrap_or(today);
    let from = from.max(today);
    let to = to.min(horizon);
    let earliest_start = now + Duration::hours(settings.min_booking_notice_hours.max(0));

    tracing::debug!(
        "Computing slots for practitioner {} from {} to {} (tz {})",
        settings.practitioner_id,
        from,
        to,
        settings.timezone
    );

    let mut slots = Vec::new();
    let mut date = from;
    while date <= to {
        let windows = day_windows(inputs.rules, inputs.overrides, date)?;
        if windows.is_empty() {
            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
            continue;
        }

        let occupied = occupied_spans(inputs, date, tz, buffer);

        for window in windows {
            for free in subtract_spans(window, &occupied) {
                let mut start = free.start;
                while start + duration <= free.end {
                    let slot_bounds = local_datetime(tz, date, start)
                        .zip(local_datetime(tz, date, start + duration));
                    if let Some((slot_start, slot_end)) = slot_bounds {
                        if slot_start.with_timezone(&Utc) >= earliest_start {
                            slots.push((slot_start, slot_end));
                        }
                    }
                    start += duration;
                }
            }
        }

        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    Ok(slots)
}

/// The raw availability windows of one date: the override if present,
/// otherwise the active weekly rules for that weekday, sorted by start.
///
/// Also used by the booking path to re-check, at commit time, that a
/// requested slot still lies within current availability.
pub fn day_windows(
    rules: &[WeeklyRule],
    overrides: &[DateOverride],
    date: NaiveDate,
) -> Result<Vec<MinuteSpan>, AvailabilityError> {
    if let Some(entry) = overrides.iter().find(|o| o.date == date) {
        if !entry.is_available {
            return Ok(vec![]);
        }
        // Validated at edit time; an available override without times that
        // slipped through is an error here, never a silent default.
        let (Some(start), Some(end)) = (entry.start_time, entry.end_time) else {
            return Err(AvailabilityError::ValidationError(format!(
                "Override for {date} is available but has no times"
            )));
        };
        return Ok(MinuteSpan::from_times(start, end).into_iter().collect());
    }

    let weekday = weekday_index(date);
    let mut windows: Vec<MinuteSpan> = rules
        .iter()
        .filter(|r| r.active && r.day_of_week == weekday)
        .filter_map(|r| MinuteSpan::from_times(r.start_time, r.end_time))
        .collect();
    windows.sort_by_key(|w| w.start);
    Ok(windows)
}

/// The merged occupied set of one date: cached busy intervals projected into
/// the practitioner frame plus blocking appointments, each expanded by the
/// buffer and clipped to the day.
fn occupied_spans(
    inputs: &SlotInputs<'_>,
    date: NaiveDate,
    tz: Tz,
    buffer: i64,
) -> Vec<MinuteSpan> {
    let mut occupied = Vec::new();

    for busy in inputs.busy {
        if let Some(span) = project_onto_local_date(busy.start, busy.end, tz, date) {
            occupied.push(span.expand_clipped(buffer));
        }
    }

    for appointment in inputs.appointments {
        if appointment.date == date && appointment.status.is_blocking() {
            if let Some(span) =
                MinuteSpan::from_times(appointment.start_time, appointment.end_time)
            {
                occupied.push(span.expand_clipped(buffer));
            }
        }
    }

    merge_spans(&occupied)
}
