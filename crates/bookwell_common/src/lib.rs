// --- File: crates/bookwell_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error taxonomy shared across crates
pub mod http; // Error-to-response mapping for handlers
pub mod logging; // Tracing subscriber setup
pub mod models; // Domain models: appointments, rules, overrides, settings
pub mod services; // Service trait seams (busy-time provider, notifications)
pub mod time; // Injected clock, minute-span arithmetic, timezone helpers

#[cfg(test)]
mod models_test;

// Re-export error types and utilities for easier access
pub use error::{
    conflict, dispatch_error, internal_error, not_found, upstream_sync_error, validation_error,
    BookwellError, HttpStatusCode,
};

pub use time::{Clock, FixedClock, SystemClock};
