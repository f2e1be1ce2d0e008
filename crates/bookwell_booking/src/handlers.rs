// File: crates/bookwell_booking/src/handlers.rs
use crate::logic::{
    cancel_appointment, create_booking, create_session, update_session_status, verify_booking,
    AppointmentsQuery, AppointmentsResponse, BookingError, BookingResponse, CreateBookingRequest,
    SlotRequest, UpdateSessionStatusRequest,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use bookwell_common::http::into_response;
use bookwell_common::time::Clock;
use bookwell_db::{LedgerRepository, Repositories};
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// Define shared state needed by booking handlers
#[derive(Clone)]
pub struct BookingState {
    pub repos: Arc<Repositories>,
    pub clock: Arc<dyn Clock>,
}

fn booking_error_response(err: BookingError) -> (StatusCode, String) {
    match err {
        BookingError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        BookingError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        BookingError::SlotNoLongerAvailable => (
            StatusCode::CONFLICT,
            "Requested time slot is no longer available. Please re-fetch availability."
                .to_string(),
        ),
        BookingError::DatabaseError(msg) => {
            tracing::error!("Booking failed: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process booking.".to_string(),
            )
        }
    }
}

fn parse_slot_request(payload: CreateBookingRequest) -> Result<SlotRequest, (StatusCode, String)> {
    let date = NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid date format (YYYY-MM-DD)".to_string(),
        )
    })?;
    let start_time = NaiveTime::parse_from_str(&payload.start_time, "%H:%M").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid start_time format (HH:MM)".to_string(),
        )
    })?;
    let end_time = NaiveTime::parse_from_str(&payload.end_time, "%H:%M").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid end_time format (HH:MM)".to_string(),
        )
    })?;

    Ok(SlotRequest {
        practitioner_id: payload.practitioner_id,
        date,
        start_time,
        end_time,
        client_name: payload.client_name,
        client_email: payload.client_email,
        notes: payload.notes,
    })
}

/// Handler to book a slot.
#[axum::debug_handler]
pub async fn create_booking_handler(
    State(state): State<Arc<BookingState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<BookingResponse>, (StatusCode, String)> {
    let request = parse_slot_request(payload)?;

    match create_booking(
        &state.repos.availability,
        &state.repos.ledger,
        state.clock.as_ref(),
        request,
    )
    .await
    {
        Ok(appointment) => {
            info!("Booking {} created, pending verification", appointment.id);
            Ok(Json(BookingResponse {
                success: true,
                booking_id: Some(appointment.id),
                status: Some(appointment.status),
                message: "Booking created. Please verify your email address.".to_string(),
            }))
        }
        Err(e) => Err(booking_error_response(e)),
    }
}

/// Handler for the email-verification step of a booking.
#[axum::debug_handler]
pub async fn verify_booking_handler(
    State(state): State<Arc<BookingState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, (StatusCode, String)> {
    match verify_booking(&state.repos.ledger, booking_id).await {
        Ok(appointment) => Ok(Json(BookingResponse {
            success: true,
            booking_id: Some(appointment.id),
            status: Some(appointment.status),
            message: "Booking confirmed.".to_string(),
        })),
        Err(e) => Err(booking_error_response(e)),
    }
}

/// Handler to cancel a booking or session.
#[axum::debug_handler]
pub async fn cancel_appointment_handler(
    State(state): State<Arc<BookingState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, (StatusCode, String)> {
    match cancel_appointment(&state.repos.ledger, appointment_id).await {
        Ok(appointment) => {
            info!("Appointment {} cancelled", appointment.id);
            Ok(Json(BookingResponse {
                success: true,
                booking_id: Some(appointment.id),
                status: Some(appointment.status),
                message: "Appointment cancelled.".to_string(),
            }))
        }
        Err(e) => Err(booking_error_response(e)),
    }
}

/// Handler for practitioner-created sessions.
#[axum::debug_handler]
pub async fn create_session_handler(
    State(state): State<Arc<BookingState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<BookingResponse>, (StatusCode, String)> {
    let request = parse_slot_request(payload)?;

    match create_session(
        &state.repos.availability,
        &state.repos.ledger,
        state.clock.as_ref(),
        request,
    )
    .await
    {
        Ok(appointment) => {
            info!("Session {} scheduled", appointment.id);
            Ok(Json(BookingResponse {
                success: true,
                booking_id: Some(appointment.id),
                status: Some(appointment.status),
                message: "Session scheduled.".to_string(),
            }))
        }
        Err(e) => Err(booking_error_response(e)),
    }
}

/// Handler to move a session to completed / cancelled / no_show.
#[axum::debug_handler]
pub async fn update_session_status_handler(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<UpdateSessionStatusRequest>,
) -> Result<Json<BookingResponse>, (StatusCode, String)> {
    match update_session_status(&state.repos.ledger, session_id, payload.status).await {
        Ok(appointment) => Ok(Json(BookingResponse {
            success: true,
            booking_id: Some(appointment.id),
            status: Some(appointment.status),
            message: "Session updated.".to_string(),
        })),
        Err(e) => Err(booking_error_response(e)),
    }
}

/// Handler to list appointments in a date range.
#[axum::debug_handler]
pub async fn list_appointments_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<AppointmentsQuery>,
) -> Result<Json<AppointmentsResponse>, (StatusCode, String)> {
    let start_date = NaiveDate::parse_from_str(&query.start_date, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid start_date format (YYYY-MM-DD)".to_string(),
        )
    })?;
    let end_date = NaiveDate::parse_from_str(&query.end_date, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid end_date format (YYYY-MM-DD)".to_string(),
        )
    })?;
    if end_date < start_date {
        return Err((
            StatusCode::BAD_REQUEST,
            "end_date must be after start_date".to_string(),
        ));
    }

    let appointments = state
        .repos
        .ledger
        .list_range(query.practitioner_id, start_date, end_date)
        .await
        .map_err(into_response)?;
    Ok(Json(AppointmentsResponse { appointments }))
}
