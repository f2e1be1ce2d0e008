// File: crates/bookwell_reminders/src/handlers.rs
use crate::logic::{run_reminder_batch, ReminderBatchSummary, ReminderRules};
use crate::service::HttpNotificationService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use bookwell_common::http::into_response;
use bookwell_common::models::{
    Appointment, AppointmentKind, AppointmentStatus, RsvpStatus,
};
use bookwell_common::time::Clock;
use bookwell_config::AppConfig;
use bookwell_db::{LedgerRepository, Repositories};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// Define shared state needed by the reminder handlers
#[derive(Clone)]
pub struct ReminderState {
    pub config: Arc<AppConfig>,
    pub repos: Arc<Repositories>,
    pub notifier: Arc<HttpNotificationService>,
    pub clock: Arc<dyn Clock>,
}

// --- RSVP Data Structures ---

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum RsvpAction {
    Accept,
    Decline,
    Propose,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RsvpResponseRequest {
    pub action: RsvpAction,
    /// Required for `propose`: date in YYYY-MM-DD format
    pub proposed_date: Option<String>,
    /// Required for `propose`: start in HH:MM format, practitioner-local
    pub proposed_start_time: Option<String>,
    /// Required for `propose`: end in HH:MM format, practitioner-local
    pub proposed_end_time: Option<String>,
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ProposalDecision {
    Accept,
    Decline,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProposalDecisionRequest {
    pub action: ProposalDecision,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RsvpResponse {
    pub success: bool,
    pub rsvp_status: Option<RsvpStatus>,
    pub message: String,
}

// --- Handlers ---

/// Handler that runs one reminder batch. Gated by the trigger token.
#[axum::debug_handler]
pub async fn run_reminders_handler(
    State(state): State<Arc<ReminderState>>,
) -> Result<Json<ReminderBatchSummary>, (StatusCode, String)> {
    let rules = state
        .config
        .reminders
        .as_ref()
        .map(ReminderRules::from)
        .unwrap_or_default();

    let summary = run_reminder_batch(
        &state.repos.ledger,
        &state.repos.availability,
        state.notifier.as_ref(),
        state.clock.as_ref(),
        &rules,
    )
    .await
    .map_err(into_response)?;

    info!(
        "Reminder batch done: {} scanned, {} sent, {} errors",
        summary.scanned,
        summary.sent.total(),
        summary.errors.len()
    );
    Ok(Json(summary))
}

async fn load_scheduled_session(
    state: &ReminderState,
    id: Uuid,
) -> Result<Appointment, (StatusCode, String)> {
    let appointment = state
        .repos
        .ledger
        .find_by_id(id)
        .await
        .map_err(into_response)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Appointment {id} not found")))?;

    if appointment.kind != AppointmentKind::Session
        || appointment.status != AppointmentStatus::Scheduled
    {
        return Err((
            StatusCode::BAD_REQUEST,
            "RSVP is only available on scheduled sessions".to_string(),
        ));
    }
    Ok(appointment)
}

/// Handler for the recipient's RSVP: accept, decline, or propose another
/// time.
#[axum::debug_handler]
pub async fn rsvp_respond_handler(
    State(state): State<Arc<ReminderState>>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<RsvpResponseRequest>,
) -> Result<Json<RsvpResponse>, (StatusCode, String)> {
    load_scheduled_session(&state, session_id).await?;

    match payload.action {
        RsvpAction::Accept => {
            state
                .repos
                .ledger
                .set_rsvp_status(session_id, RsvpStatus::Accepted)
                .await
                .map_err(into_response)?;
            Ok(Json(RsvpResponse {
                success: true,
                rsvp_status: Some(RsvpStatus::Accepted),
                message: "Appointment confirmed.".to_string(),
            }))
        }
        RsvpAction::Decline => {
            state
                .repos
                .ledger
                .set_rsvp_status(session_id, RsvpStatus::Declined)
                .await
                .map_err(into_response)?;
            Ok(Json(RsvpResponse {
                success: true,
                rsvp_status: Some(RsvpStatus::Declined),
                message: "Appointment declined.".to_string(),
            }))
        }
        RsvpAction::Propose => {
            let date = payload
                .proposed_date
                .as_deref()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
            let start = payload
                .proposed_start_time
                .as_deref()
                .and_then(|s| NaiveTime::parse_from_str(s, "%H:%M").ok());
            let end = payload
                .proposed_end_time
                .as_deref()
                .and_then(|s| NaiveTime::parse_from_str(s, "%H:%M").ok());
            let (Some(date), Some(start), Some(end)) = (date, start, end) else {
                return Err((
                    StatusCode::BAD_REQUEST,
                    "A proposal requires proposed_date (YYYY-MM-DD), proposed_start_time and \
                     proposed_end_time (HH:MM)"
                        .to_string(),
                ));
            };
            if start >= end {
                return Err((
                    StatusCode::BAD_REQUEST,
                    "proposed_start_time must be before proposed_end_time".to_string(),
                ));
            }

            state
                .repos
                .ledger
                .store_proposal(session_id, date, start, end, payload.message)
                .await
                .map_err(into_response)?;
            info!("Reschedule proposed for session {}", session_id);
            Ok(Json(RsvpResponse {
                success: true,
                rsvp_status: Some(RsvpStatus::RescheduleRequested),
                message: "Reschedule request recorded.".to_string(),
            }))
        }
    }
}

/// Handler for the practitioner's decision on a reschedule proposal.
#[axum::debug_handler]
pub async fn resolve_proposal_handler(
    State(state): State<Arc<ReminderState>>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<ProposalDecisionRequest>,
) -> Result<Json<RsvpResponse>, (StatusCode, String)> {
    let appointment = load_scheduled_session(&state, session_id).await?;

    match payload.action {
        ProposalDecision::Accept => {
            let (Some(date), Some(start), Some(end)) = (
                appointment.proposed_date,
                appointment.proposed_start_time,
                appointment.proposed_end_time,
            ) else {
                return Err((
                    StatusCode::BAD_REQUEST,
                    "Session has no pending reschedule proposal".to_string(),
                ));
            };

            // the move re-runs the overlap guard against the new time
            let moved = state
                .repos
                .ledger
                .accept_proposal(session_id, date, start, end)
                .await
                .map_err(|e| match e {
                    bookwell_db::DbError::Conflict(_) => (
                        StatusCode::CONFLICT,
                        "The proposed time is no longer available.".to_string(),
                    ),
                    other => into_response(other),
                })?;
            info!("Session {} rescheduled to {} {}", session_id, date, start);
            Ok(Json(RsvpResponse {
                success: true,
                rsvp_status: moved.rsvp_status,
                message: "Session rescheduled to the proposed time.".to_string(),
            }))
        }
        ProposalDecision::Decline => {
            state
                .repos
                .ledger
                .decline_proposal(session_id)
                .await
                .map_err(into_response)?;
            Ok(Json(RsvpResponse {
                success: true,
                rsvp_status: Some(RsvpStatus::Pending),
                message: "Proposal declined; the session keeps its original time.".to_string(),
            }))
        }
    }
}
