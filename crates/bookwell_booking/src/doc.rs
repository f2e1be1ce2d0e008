// File: crates/bookwell_booking/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{
    AppointmentsQuery, AppointmentsResponse, BookingResponse, CreateBookingRequest,
    UpdateSessionStatusRequest,
};

#[utoipa::path(
    post,
    path = "/bookings",
    request_body(content = CreateBookingRequest, example = json!({
        "practitioner_id": "5f3b1fa0-0000-0000-0000-000000000000",
        "date": "2025-05-15",
        "start_time": "10:00",
        "end_time": "11:00",
        "client_name": "Ada Client",
        "client_email": "ada@example.com"
    })),
    responses(
        (status = 200, description = "Booking created, pending verification", body = BookingResponse),
        (status = 400, description = "Invalid request or outside the booking window"),
        (status = 404, description = "Unknown practitioner"),
        (status = 409, description = "Slot no longer available",
         example = json!({
             "success": false,
             "booking_id": null,
             "status": null,
             "message": "Requested time slot is no longer available. Please re-fetch availability."
         })
        )
    )
)]
fn doc_create_booking_handler() {}

#[utoipa::path(
    post,
    path = "/bookings/{booking_id}/verify",
    params(
        ("booking_id" = String, Path, description = "The booking to verify")
    ),
    responses(
        (status = 200, description = "Booking confirmed", body = BookingResponse),
        (status = 404, description = "Booking not found or not pending verification")
    )
)]
fn doc_verify_booking_handler() {}

#[utoipa::path(
    post,
    path = "/bookings/{appointment_id}/cancel",
    params(
        ("appointment_id" = String, Path, description = "The booking or session to cancel")
    ),
    responses(
        (status = 200, description = "Cancelled", body = BookingResponse),
        (status = 400, description = "Appointment is not in a cancellable state"),
        (status = 404, description = "Appointment not found")
    )
)]
fn doc_cancel_appointment_handler() {}

#[utoipa::path(
    post,
    path = "/sessions",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Session scheduled", body = BookingResponse),
        (status = 409, description = "Time overlaps an existing appointment")
    )
)]
fn doc_create_session_handler() {}

#[utoipa::path(
    patch,
    path = "/sessions/{session_id}/status",
    params(
        ("session_id" = String, Path, description = "The session to update")
    ),
    request_body = UpdateSessionStatusRequest,
    responses(
        (status = 200, description = "Session updated", body = BookingResponse),
        (status = 400, description = "Illegal status transition")
    )
)]
fn doc_update_session_status_handler() {}

#[utoipa::path(
    get,
    path = "/bookings",
    params(AppointmentsQuery),
    responses(
        (status = 200, description = "Appointments in range", body = AppointmentsResponse)
    )
)]
fn doc_list_appointments_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_create_booking_handler,
        doc_verify_booking_handler,
        doc_cancel_appointment_handler,
        doc_create_session_handler,
        doc_update_session_status_handler,
        doc_list_appointments_handler
    ),
    components(
        schemas(
            CreateBookingRequest,
            BookingResponse,
            UpdateSessionStatusRequest,
            AppointmentsResponse
        )
    ),
    tags(
        (name = "booking", description = "Booking creation and lifecycle")
    ),
    servers(
        (url = "/api", description = "Main API Prefix")
    )
)]
pub struct BookingApiDoc;
