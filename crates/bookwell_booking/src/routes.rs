// --- File: crates/bookwell_booking/src/routes.rs ---

use crate::handlers::{
    cancel_appointment_handler, create_booking_handler, create_session_handler,
    list_appointments_handler, update_session_status_handler, verify_booking_handler,
    BookingState,
};
use axum::{
    routing::{patch, post},
    Router,
};
use bookwell_common::time::{Clock, SystemClock};
use bookwell_db::Repositories;
use std::sync::Arc;

/// Creates a router containing all routes for bookings and sessions.
pub fn routes(repos: Arc<Repositories>) -> Router {
    routes_with_clock(repos, Arc::new(SystemClock))
}

/// Same as [`routes`], with an injected clock for deterministic tests.
pub fn routes_with_clock(repos: Arc<Repositories>, clock: Arc<dyn Clock>) -> Router {
    let state = Arc::new(BookingState { repos, clock });

    Router::new()
        .route(
            "/bookings",
            post(create_booking_handler).get(list_appointments_handler),
        )
        .route("/bookings/{booking_id}/verify", post(verify_booking_handler))
        .route(
            "/bookings/{appointment_id}/cancel",
            post(cancel_appointment_handler),
        )
        .route("/sessions", post(create_session_handler))
        .route(
            "/sessions/{session_id}/status",
            patch(update_session_status_handler),
        )
        .with_state(state)
}
