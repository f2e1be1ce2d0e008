// --- File: crates/bookwell_gcal/src/routes.rs ---

use crate::auth::create_calendar_hub;
use crate::handlers::{
    list_calendar_links_handler, sync_busy_handler, upsert_calendar_link_handler, GcalState,
};
use crate::service::GoogleBusyTimeProvider;
use axum::{
    routing::{get, post},
    Router,
};
use bookwell_common::time::SystemClock;
use bookwell_config::AppConfig;
use bookwell_db::Repositories;
use std::sync::Arc;

/// Creates a router containing all routes for the Google Calendar busy sync.
/// Builds the authenticated hub from the configured service-account key.
pub async fn routes(config: Arc<AppConfig>, repos: Arc<Repositories>) -> Router {
    let calendar_hub = create_calendar_hub(config.gcal.as_ref().expect("GCal config missing"))
        .await
        .expect("Failed to create Google Calendar hub");

    let state = Arc::new(GcalState {
        repos,
        provider: Arc::new(GoogleBusyTimeProvider::new(Arc::new(calendar_hub))),
        clock: Arc::new(SystemClock),
    });

    Router::new()
        .route("/sync/busy/{practitioner_id}", post(sync_busy_handler))
        .route(
            "/practitioners/{practitioner_id}/calendar-links",
            get(list_calendar_links_handler).put(upsert_calendar_link_handler),
        )
        .with_state(state)
}
