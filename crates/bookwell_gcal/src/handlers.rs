// File: crates/bookwell_gcal/src/handlers.rs
use crate::service::GoogleBusyTimeProvider;
use crate::sync::{sync_busy_for_practitioner, SyncReport};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use bookwell_common::http::error_response;
use bookwell_common::models::CalendarLink;
use bookwell_common::time::Clock;
use bookwell_db::{BusyCacheRepository, Repositories};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

// Define shared state needed by the sync handlers
#[derive(Clone)]
pub struct GcalState {
    pub repos: Arc<Repositories>,
    pub provider: Arc<GoogleBusyTimeProvider>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CalendarLinksResponse {
    pub links: Vec<CalendarLink>,
}

/// Handler to run the busy-time sync cycle for one practitioner.
#[axum::debug_handler]
pub async fn sync_busy_handler(
    State(state): State<Arc<GcalState>>,
    Path(practitioner_id): Path<Uuid>,
) -> Result<Json<SyncReport>, (StatusCode, String)> {
    let report = sync_busy_for_practitioner(
        state.provider.as_ref(),
        &state.repos.busy_cache,
        &state.repos.availability,
        state.clock.as_ref(),
        practitioner_id,
    )
    .await
    .map_err(error_response)?;

    Ok(Json(report))
}

/// Handler to link an external calendar to a practitioner.
#[axum::debug_handler]
pub async fn upsert_calendar_link_handler(
    State(state): State<Arc<GcalState>>,
    Path(practitioner_id): Path<Uuid>,
    Json(link): Json<CalendarLink>,
) -> Result<Json<CalendarLink>, (StatusCode, String)> {
    if link.provider.trim().is_empty() || link.calendar_ref.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "provider and calendar_ref are required".to_string(),
        ));
    }

    state
        .repos
        .busy_cache
        .upsert_calendar_link(practitioner_id, link.clone())
        .await
        .map_err(|e| error_response(e.into()))?;
    Ok(Json(link))
}

/// Handler to list a practitioner's linked calendars.
#[axum::debug_handler]
pub async fn list_calendar_links_handler(
    State(state): State<Arc<GcalState>>,
    Path(practitioner_id): Path<Uuid>,
) -> Result<Json<CalendarLinksResponse>, (StatusCode, String)> {
    let links = state
        .repos
        .busy_cache
        .list_calendar_links(practitioner_id)
        .await
        .map_err(|e| error_response(e.into()))?;
    Ok(Json(CalendarLinksResponse { links }))
}
