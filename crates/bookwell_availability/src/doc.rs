// File: crates/bookwell_availability/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{AvailabilityQuery, AvailableSlot, AvailableSlotsResponse};
use crate::schedule::{
    OverridesResponse, ReplaceScheduleRequest, ScheduleResponse, UpdateSettingsRequest,
};
use bookwell_common::models::{BookingSettings, DateOverride, WeeklyRule};

#[utoipa::path(
    get,
    path = "/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Available time slots, chronological", body = AvailableSlotsResponse),
        (status = 400, description = "Invalid date format or range", body = String),
        (status = 404, description = "No booking settings for practitioner", body = String)
    )
)]
fn doc_get_availability_handler() {}

#[utoipa::path(
    put,
    path = "/practitioners/{practitioner_id}/schedule",
    params(
        ("practitioner_id" = String, Path, description = "Practitioner ID")
    ),
    request_body(content = ReplaceScheduleRequest, example = json!({
        "rules": [
            {"day_of_week": 0, "start_time": "09:00:00", "end_time": "17:00:00", "active": true}
        ]
    })),
    responses(
        (status = 200, description = "The saved week", body = ScheduleResponse),
        (status = 400, description = "Invalid or overlapping rules", body = String)
    )
)]
fn doc_replace_schedule_handler() {}

#[utoipa::path(
    put,
    path = "/practitioners/{practitioner_id}/overrides",
    params(
        ("practitioner_id" = String, Path, description = "Practitioner ID")
    ),
    request_body(content = DateOverride, example = json!({
        "date": "2025-05-12",
        "is_available": false,
        "start_time": null,
        "end_time": null,
        "reason": "conference"
    })),
    responses(
        (status = 200, description = "The saved override", body = DateOverride),
        (status = 400, description = "Available override missing times", body = String)
    )
)]
fn doc_upsert_override_handler() {}

#[utoipa::path(
    get,
    path = "/practitioners/{practitioner_id}/overrides",
    params(
        ("practitioner_id" = String, Path, description = "Practitioner ID"),
        ("start_date" = String, Query, description = "Start date in YYYY-MM-DD format"),
        ("end_date" = String, Query, description = "End date in YYYY-MM-DD format")
    ),
    responses(
        (status = 200, description = "Overrides in range", body = OverridesResponse)
    )
)]
fn doc_list_overrides_handler() {}

#[utoipa::path(
    put,
    path = "/practitioners/{practitioner_id}/settings",
    params(
        ("practitioner_id" = String, Path, description = "Practitioner ID")
    ),
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "The saved settings", body = BookingSettings),
        (status = 400, description = "Invalid settings", body = String)
    )
)]
fn doc_update_settings_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_get_availability_handler,
        doc_replace_schedule_handler,
        doc_upsert_override_handler,
        doc_list_overrides_handler,
        doc_update_settings_handler
    ),
    components(
        schemas(
            AvailabilityQuery,
            AvailableSlot,
            AvailableSlotsResponse,
            ReplaceScheduleRequest,
            ScheduleResponse,
            OverridesResponse,
            UpdateSettingsRequest,
            WeeklyRule,
            DateOverride,
            BookingSettings
        )
    ),
    tags(
        (name = "availability", description = "Slot generation and schedule editing")
    ),
    servers(
        (url = "/api", description = "Main API Prefix")
    )
)]
pub struct AvailabilityApiDoc;
