// File: crates/bookwell_gcal/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::CalendarLinksResponse;
use crate::sync::{CalendarSyncOutcome, SyncReport};
use bookwell_common::models::CalendarLink;

#[utoipa::path(
    post,
    path = "/sync/busy/{practitioner_id}",
    params(
        ("practitioner_id" = String, Path, description = "Practitioner ID")
    ),
    responses(
        (status = 200, description = "Per-calendar sync outcomes; the cache is only replaced when every fetch succeeded", body = SyncReport),
        (status = 500, description = "Cache replacement failed")
    )
)]
fn doc_sync_busy_handler() {}

#[utoipa::path(
    put,
    path = "/practitioners/{practitioner_id}/calendar-links",
    params(
        ("practitioner_id" = String, Path, description = "Practitioner ID")
    ),
    request_body(content = CalendarLink, example = json!({
        "provider": "google",
        "calendar_ref": "practice@example.com"
    })),
    responses(
        (status = 200, description = "The saved link", body = CalendarLink),
        (status = 400, description = "Missing provider or calendar_ref")
    )
)]
fn doc_upsert_calendar_link_handler() {}

#[utoipa::path(
    get,
    path = "/practitioners/{practitioner_id}/calendar-links",
    params(
        ("practitioner_id" = String, Path, description = "Practitioner ID")
    ),
    responses(
        (status = 200, description = "Linked calendars", body = CalendarLinksResponse)
    )
)]
fn doc_list_calendar_links_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_sync_busy_handler,
        doc_upsert_calendar_link_handler,
        doc_list_calendar_links_handler
    ),
    components(
        schemas(SyncReport, CalendarSyncOutcome, CalendarLink, CalendarLinksResponse)
    ),
    tags(
        (name = "gcal", description = "External calendar busy-time sync")
    ),
    servers(
        (url = "/api", description = "Main API Prefix")
    )
)]
pub struct GcalApiDoc;
