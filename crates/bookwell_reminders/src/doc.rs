// File: crates/bookwell_reminders/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    ProposalDecision, ProposalDecisionRequest, RsvpAction, RsvpResponse, RsvpResponseRequest,
};
use crate::logic::{ReminderBatchSummary, ReminderItemError, SentCounts};

#[utoipa::path(
    post,
    path = "/reminders/run",
    responses(
        (status = 200, description = "Per-kind sent counts and per-item errors", body = ReminderBatchSummary,
         example = json!({
             "scanned": 12,
             "sent": {"rsvp_first": 1, "rsvp_second": 0, "session_24h": 3, "session_1h": 1},
             "errors": []
         })
        ),
        (status = 401, description = "Missing or invalid trigger token")
    ),
    security(
        ("bearer_token" = [])
    )
)]
fn doc_run_reminders_handler() {}

#[utoipa::path(
    post,
    path = "/rsvp/{session_id}",
    params(
        ("session_id" = String, Path, description = "The session being answered")
    ),
    request_body(content = RsvpResponseRequest, example = json!({
        "action": "propose",
        "proposed_date": "2025-05-16",
        "proposed_start_time": "14:00",
        "proposed_end_time": "15:00",
        "message": "Could we do the afternoon instead?"
    })),
    responses(
        (status = 200, description = "RSVP recorded", body = RsvpResponse),
        (status = 400, description = "Not a scheduled session, or proposal fields missing"),
        (status = 404, description = "Session not found")
    )
)]
fn doc_rsvp_respond_handler() {}

#[utoipa::path(
    post,
    path = "/rsvp/{session_id}/proposal",
    params(
        ("session_id" = String, Path, description = "The session whose proposal is decided")
    ),
    request_body = ProposalDecisionRequest,
    responses(
        (status = 200, description = "Proposal resolved", body = RsvpResponse),
        (status = 409, description = "Proposed time now overlaps another appointment")
    )
)]
fn doc_resolve_proposal_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_run_reminders_handler,
        doc_rsvp_respond_handler,
        doc_resolve_proposal_handler
    ),
    components(
        schemas(
            ReminderBatchSummary,
            SentCounts,
            ReminderItemError,
            RsvpAction,
            RsvpResponseRequest,
            ProposalDecision,
            ProposalDecisionRequest,
            RsvpResponse
        )
    ),
    tags(
        (name = "reminders", description = "Reminder batch and RSVP negotiation")
    ),
    servers(
        (url = "/api", description = "Main API Prefix")
    )
)]
pub struct RemindersApiDoc;
