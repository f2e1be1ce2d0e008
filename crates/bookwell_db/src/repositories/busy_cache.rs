//! Repository for the external busy-time cache
//!
//! Busy intervals pulled from external calendars have no identity of their
//! own: every sync replaces the rows for a (practitioner, provider) pair in
//! one transaction. Readers during a sync may see the pre- or post-sync
//! state; staleness is bounded by the sync cadence and can only hide slots,
//! never double-book, since the booking ledger, not this cache, backs the
//! conflict guard.

use crate::error::DbError;
use bookwell_common::models::{BusyInterval, CalendarLink};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub trait BusyCacheRepository {
    /// Create the cache tables if they don't already exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Replace all cached intervals for (practitioner, provider).
    fn replace_intervals(
        &self,
        practitioner_id: Uuid,
        provider: &str,
        intervals: &[(DateTime<Utc>, DateTime<Utc>)],
    ) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Cached intervals overlapping a UTC range, across providers.
    fn list_busy(
        &self,
        practitioner_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Vec<BusyInterval>, DbError>> + Send;

    /// Register (or re-register) an external calendar to sync from.
    fn upsert_calendar_link(
        &self,
        practitioner_id: Uuid,
        link: CalendarLink,
    ) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    fn list_calendar_links(
        &self,
        practitioner_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<CalendarLink>, DbError>> + Send;
}
