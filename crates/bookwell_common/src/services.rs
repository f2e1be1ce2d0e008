// --- File: crates/bookwell_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! These traits decouple the engine from the concrete calendar and
//! notification integrations, so handlers and batch logic can be tested
//! against in-memory implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for
/// Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// Pull interface over an external calendar's busy time.
///
/// Implementations normalize whatever the provider returns into UTC
/// intervals; conversion into the practitioner's timezone happens at the
/// point of use. Called once per sync cycle, never on the slot read path.
pub trait BusyTimeProvider: Send + Sync {
    /// Error type returned by busy-time lookups.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Stable provider name, used as the busy-cache partition key.
    fn provider_name(&self) -> &'static str;

    /// Busy intervals for one external calendar within a time range.
    #[allow(clippy::type_complexity)]
    fn fetch_busy(
        &self,
        calendar_ref: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, Self::Error>;
}

/// A trait for notification service operations.
///
/// The reminder batch treats a send failure as a per-item error, never as a
/// batch failure, so implementations should report transport problems through
/// `Self::Error` rather than panicking.
pub trait NotificationService: Send + Sync {
    /// Error type returned by notification service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send an email notification.
    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> BoxFuture<'_, NotificationResult, Self::Error>;

    /// Send an SMS notification.
    fn send_sms(&self, to: &str, body: &str) -> BoxFuture<'_, NotificationResult, Self::Error>;
}

/// Represents the result of a notification operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    /// Provider-side id of the accepted message, when one is returned.
    pub id: Option<String>,
    /// The status of the notification.
    pub status: String,
}
