//! Repository for availability sources
//!
//! Weekly rules, date overrides and the per-practitioner booking settings.
//! The weekly schedule has replace-all-on-save semantics: the editor submits
//! the whole week and the repository swaps it in a single transaction, so no
//! orphaned rules survive a partial failure. Overrides are upserts keyed by
//! (practitioner, date).

use crate::error::DbError;
use bookwell_common::models::{BookingSettings, DateOverride, WeeklyRule};
use uuid::Uuid;

pub trait AvailabilityRepository {
    /// Create the availability tables if they don't already exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Replace the practitioner's whole weekly schedule in one transaction.
    fn replace_weekly_schedule(
        &self,
        practitioner_id: Uuid,
        rules: &[WeeklyRule],
    ) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// All weekly rules for a practitioner, ordered by day then start.
    fn list_weekly_rules(
        &self,
        practitioner_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<WeeklyRule>, DbError>> + Send;

    /// Insert or update the override for (practitioner, date).
    fn upsert_override(
        &self,
        practitioner_id: Uuid,
        entry: DateOverride,
    ) -> impl std::future::Future<Output = Result<DateOverride, DbError>> + Send;

    /// Overrides within an inclusive date range, ordered by date.
    fn list_overrides(
        &self,
        practitioner_id: Uuid,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> impl std::future::Future<Output = Result<Vec<DateOverride>, DbError>> + Send;

    /// Insert or update the practitioner's booking settings.
    fn upsert_settings(
        &self,
        settings: BookingSettings,
    ) -> impl std::future::Future<Output = Result<BookingSettings, DbError>> + Send;

    /// The practitioner's booking settings, if any.
    fn get_settings(
        &self,
        practitioner_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<BookingSettings>, DbError>> + Send;
}
