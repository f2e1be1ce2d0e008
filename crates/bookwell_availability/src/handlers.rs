// File: crates/bookwell_availability/src/handlers.rs
use crate::logic::{
    compute_available_slots, AvailabilityError, AvailabilityQuery, AvailableSlot,
    AvailableSlotsResponse, SlotInputs,
};
use crate::schedule::{
    validate_override, validate_settings, validate_weekly_schedule, OverridesResponse,
    ReplaceScheduleRequest, ScheduleResponse, UpdateSettingsRequest,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use bookwell_common::http::into_response;
use bookwell_common::models::{BookingSettings, DateOverride};
use bookwell_common::time::{local_datetime, Clock, MINUTES_PER_DAY};
use bookwell_db::{
    AvailabilityRepository, BusyCacheRepository, LedgerRepository, Repositories,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// Define shared state needed by availability handlers
#[derive(Clone)]
pub struct AvailabilityState {
    pub repos: Arc<Repositories>,
    pub clock: Arc<dyn Clock>,
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, (StatusCode, String)> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid {field} format (YYYY-MM-DD)"),
        )
    })
}

/// Handler to get available time slots.
#[axum::debug_handler]
pub async fn get_availability_handler(
    State(state): State<Arc<AvailabilityState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailableSlotsResponse>, (StatusCode, String)> {
    // --- Parse Dates & Validate ---
    let start_date = parse_date(&query.start_date, "start_date")?;
    let end_date = parse_date(&query.end_date, "end_date")?;
    if end_date < start_date {
        return Err((
            StatusCode::BAD_REQUEST,
            "end_date must be after start_date".to_string(),
        ));
    }

    let settings = state
        .repos
        .availability
        .get_settings(query.practitioner_id)
        .await
        .map_err(into_response)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                "No booking settings for practitioner".to_string(),
            )
        })?;
    let tz = settings.tz().map_err(into_response)?;

    // --- Gather Inputs ---
    let rules = state
        .repos
        .availability
        .list_weekly_rules(query.practitioner_id)
        .await
        .map_err(into_response)?;
    let overrides = state
        .repos
        .availability
        .list_overrides(query.practitioner_id, start_date, end_date)
        .await
        .map_err(into_response)?;

    // Busy intervals are cached UTC; fetch the local day bounds of the range
    let range_start = local_datetime(tz, start_date, 0)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not resolve range start in practitioner timezone".to_string(),
            )
        })?;
    let range_end = local_datetime(tz, end_date, MINUTES_PER_DAY)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not resolve range end in practitioner timezone".to_string(),
            )
        })?;

    let busy = state
        .repos
        .busy_cache
        .list_busy(query.practitioner_id, range_start, range_end)
        .await
        .map_err(into_response)?;
    let appointments = state
        .repos
        .ledger
        .list_blocking(query.practitioner_id, start_date, end_date)
        .await
        .map_err(into_response)?;

    // --- Calculate Slots ---
    let inputs = SlotInputs {
        settings: &settings,
        rules: &rules,
        overrides: &overrides,
        busy: &busy,
        appointments: &appointments,
    };
    let slots = compute_available_slots(&inputs, start_date, end_date, state.clock.now_utc())
        .map_err(|e| match e {
            AvailabilityError::TimeParseError(msg) => (StatusCode::BAD_REQUEST, msg),
            AvailabilityError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        })?;

    let duration = settings.slot_duration_minutes;
    Ok(Json(AvailableSlotsResponse {
        slots: slots
            .into_iter()
            .map(|(start, end)| AvailableSlot {
                start_time: start.to_rfc3339(),
                end_time: end.to_rfc3339(),
                duration_minutes: duration,
            })
            .collect(),
    }))
}

/// Handler to replace a practitioner's whole weekly schedule.
#[axum::debug_handler]
pub async fn replace_schedule_handler(
    State(state): State<Arc<AvailabilityState>>,
    Path(practitioner_id): Path<Uuid>,
    Json(payload): Json<ReplaceScheduleRequest>,
) -> Result<Json<ScheduleResponse>, (StatusCode, String)> {
    validate_weekly_schedule(&payload.rules)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    state
        .repos
        .availability
        .replace_weekly_schedule(practitioner_id, &payload.rules)
        .await
        .map_err(into_response)?;

    info!(
        "Weekly schedule saved for practitioner {} ({} rules)",
        practitioner_id,
        payload.rules.len()
    );
    Ok(Json(ScheduleResponse {
        rules: payload.rules,
    }))
}

/// Handler to read a practitioner's weekly schedule.
#[axum::debug_handler]
pub async fn get_schedule_handler(
    State(state): State<Arc<AvailabilityState>>,
    Path(practitioner_id): Path<Uuid>,
) -> Result<Json<ScheduleResponse>, (StatusCode, String)> {
    let rules = state
        .repos
        .availability
        .list_weekly_rules(practitioner_id)
        .await
        .map_err(into_response)?;
    Ok(Json(ScheduleResponse { rules }))
}

/// Handler to upsert a date override.
#[axum::debug_handler]
pub async fn upsert_override_handler(
    State(state): State<Arc<AvailabilityState>>,
    Path(practitioner_id): Path<Uuid>,
    Json(payload): Json<DateOverride>,
) -> Result<Json<DateOverride>, (StatusCode, String)> {
    validate_override(&payload).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let saved = state
        .repos
        .availability
        .upsert_override(practitioner_id, payload)
        .await
        .map_err(into_response)?;
    Ok(Json(saved))
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct DateRangeQuery {
    pub start_date: String, // YYYY-MM-DD format
    pub end_date: String,   // YYYY-MM-DD format
}

/// Handler to list date overrides in a range.
#[axum::debug_handler]
pub async fn list_overrides_handler(
    State(state): State<Arc<AvailabilityState>>,
    Path(practitioner_id): Path<Uuid>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<OverridesResponse>, (StatusCode, String)> {
    let start_date = parse_date(&query.start_date, "start_date")?;
    let end_date = parse_date(&query.end_date, "end_date")?;
    if end_date < start_date {
        return Err((
            StatusCode::BAD_REQUEST,
            "end_date must be after start_date".to_string(),
        ));
    }

    let overrides = state
        .repos
        .availability
        .list_overrides(practitioner_id, start_date, end_date)
        .await
        .map_err(into_response)?;
    Ok(Json(OverridesResponse { overrides }))
}

/// Handler to upsert booking settings.
#[axum::debug_handler]
pub async fn update_settings_handler(
    State(state): State<Arc<AvailabilityState>>,
    Path(practitioner_id): Path<Uuid>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<BookingSettings>, (StatusCode, String)> {
    let settings = BookingSettings {
        practitioner_id,
        slot_duration_minutes: payload.slot_duration_minutes,
        buffer_minutes: payload.buffer_minutes,
        min_booking_notice_hours: payload.min_booking_notice_hours,
        max_booking_days_ahead: payload.max_booking_days_ahead,
        timezone: payload.timezone,
        requires_approval: payload.requires_approval,
    };
    validate_settings(&settings).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let saved = state
        .repos
        .availability
        .upsert_settings(settings)
        .await
        .map_err(into_response)?;
    Ok(Json(saved))
}

/// Handler to read booking settings.
#[axum::debug_handler]
pub async fn get_settings_handler(
    State(state): State<Arc<AvailabilityState>>,
    Path(practitioner_id): Path<Uuid>,
) -> Result<Json<BookingSettings>, (StatusCode, String)> {
    state
        .repos
        .availability
        .get_settings(practitioner_id)
        .await
        .map_err(into_response)?
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                "No booking settings for practitioner".to_string(),
            )
        })
}
