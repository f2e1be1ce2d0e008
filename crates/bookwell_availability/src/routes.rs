// --- File: crates/bookwell_availability/src/routes.rs ---

use crate::handlers::{
    get_availability_handler, get_schedule_handler, get_settings_handler, list_overrides_handler,
    replace_schedule_handler, update_settings_handler, upsert_override_handler, AvailabilityState,
};
use axum::{routing::get, Router};
use bookwell_common::time::{Clock, SystemClock};
use bookwell_db::Repositories;
use std::sync::Arc;

/// Creates a router containing all routes for availability and schedule
/// editing.
pub fn routes(repos: Arc<Repositories>) -> Router {
    routes_with_clock(repos, Arc::new(SystemClock))
}

/// Same as [`routes`], with an injected clock for deterministic tests.
pub fn routes_with_clock(repos: Arc<Repositories>, clock: Arc<dyn Clock>) -> Router {
    let state = Arc::new(AvailabilityState { repos, clock });

    Router::new()
        .route("/availability", get(get_availability_handler))
        .route(
            "/practitioners/{practitioner_id}/schedule",
            get(get_schedule_handler).put(replace_schedule_handler),
        )
        .route(
            "/practitioners/{practitioner_id}/overrides",
            get(list_overrides_handler).put(upsert_override_handler),
        )
        .route(
            "/practitioners/{practitioner_id}/settings",
            get(get_settings_handler).put(update_settings_handler),
        )
        .with_state(state)
}
