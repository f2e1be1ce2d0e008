// --- File: crates/bookwell_common/src/http.rs ---
//! HTTP helpers shared by the handler crates.

use crate::error::{BookwellError, HttpStatusCode};
use http::StatusCode;

/// Map a BookwellError onto the (status, message) pair the axum handlers
/// return, using the taxonomy's status mapping.
pub fn error_response(err: BookwellError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}

/// Convenience for `map_err(into_response)` chains on fallible calls whose
/// error converts into BookwellError.
pub fn into_response<E: Into<BookwellError>>(err: E) -> (StatusCode, String) {
    error_response(err.into())
}
