// --- File: crates/bookwell_reminders/src/routes.rs ---

use crate::auth::{reminder_auth_middleware, ReminderAuthState};
use crate::handlers::{
    resolve_proposal_handler, rsvp_respond_handler, run_reminders_handler, ReminderState,
};
use crate::service::HttpNotificationService;
use axum::{middleware, routing::post, Router};
use bookwell_common::time::{Clock, SystemClock};
use bookwell_config::AppConfig;
use bookwell_db::Repositories;
use std::sync::Arc;

/// Creates a router containing the reminder trigger and the RSVP flow.
pub fn routes(config: Arc<AppConfig>, repos: Arc<Repositories>) -> Router {
    routes_with_clock(config, repos, Arc::new(SystemClock))
}

/// Same as [`routes`], with an injected clock for deterministic tests.
pub fn routes_with_clock(
    config: Arc<AppConfig>,
    repos: Arc<Repositories>,
    clock: Arc<dyn Clock>,
) -> Router {
    let notify_config = config
        .notify
        .clone()
        .expect("Notify config missing for reminders");
    let state = Arc::new(ReminderState {
        config: config.clone(),
        repos,
        notifier: Arc::new(HttpNotificationService::new(notify_config)),
        clock,
    });

    let auth_state = Arc::new(ReminderAuthState { config });

    // The trigger is token-gated; /cron/reminders is the manual-testing
    // alias and sits behind the same check (token accepted via query too).
    let trigger_router = Router::new()
        .route("/reminders/run", post(run_reminders_handler))
        .route("/cron/reminders", post(run_reminders_handler))
        .layer(middleware::from_fn_with_state(
            auth_state,
            reminder_auth_middleware,
        ))
        .with_state(state.clone());

    let rsvp_router = Router::new()
        .route("/rsvp/{session_id}", post(rsvp_respond_handler))
        .route("/rsvp/{session_id}/proposal", post(resolve_proposal_handler))
        .with_state(state);

    trigger_router.merge(rsvp_router)
}
