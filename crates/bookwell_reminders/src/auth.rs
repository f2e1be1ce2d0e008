// --- File: crates/bookwell_reminders/src/auth.rs ---

use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use bookwell_config::AppConfig;
use constant_time_eq::constant_time_eq; // For secure string comparison
use std::sync::Arc;
use tracing::warn;

// The state this auth middleware needs: the AppConfig carrying the token.
#[derive(Clone)]
pub struct ReminderAuthState {
    pub config: Arc<AppConfig>,
}

/// Axum middleware gating the reminder trigger endpoints.
///
/// The scheduler sends `Authorization: Bearer <token>`; for manual testing
/// the same token is also accepted as a `?token=` query parameter. Both are
/// compared in constant time against the configured trigger token.
pub async fn reminder_auth_middleware(
    State(auth_state): State<Arc<ReminderAuthState>>,
    req: Request<AxumBody>,
    next: Next,
) -> Response {
    let expected = match auth_state
        .config
        .reminders
        .as_ref()
        .and_then(|r| r.trigger_token.clone())
    {
        Some(token) => token,
        None => {
            warn!("Reminder trigger token not configured");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error for reminder auth.".to_string(),
            )
                .into_response();
        }
    };

    let bearer = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    let query_token = req.uri().query().and_then(|query| {
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("token=").map(str::to_string))
    });

    match bearer.or(query_token) {
        Some(provided) if constant_time_eq(provided.as_bytes(), expected.as_bytes()) => {
            next.run(req).await
        }
        Some(_) => {
            warn!("Reminder trigger: invalid token provided");
            (
                StatusCode::UNAUTHORIZED,
                "Unauthorized: Invalid credentials.".to_string(),
            )
                .into_response()
        }
        None => (
            StatusCode::UNAUTHORIZED,
            "Unauthorized: Missing bearer token.".to_string(),
        )
            .into_response(),
    }
}
