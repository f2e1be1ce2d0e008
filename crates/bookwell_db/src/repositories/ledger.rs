//! Repository for the booking ledger
//!
//! The ledger is the authoritative record of bookings and sessions, and the
//! enforcement point of the overlap invariant: no two blocking-status rows
//! for a practitioner may overlap. `insert_if_free` and `accept_proposal`
//! perform their overlap check inside the same statement that writes, so two
//! concurrent requests for one slot cannot both succeed. Slot generation is
//! advisory, this is authoritative.

use crate::error::DbError;
use bookwell_common::models::{
    Appointment, AppointmentKind, AppointmentStatus, ReminderKind, RsvpStatus,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

/// A candidate row for the guarded insert.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub id: Uuid,
    pub practitioner_id: Uuid,
    pub kind: AppointmentKind,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    pub rsvp_status: Option<RsvpStatus>,
    pub client_name: String,
    pub client_email: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub trait LedgerRepository {
    /// Create the ledger table if it doesn't already exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Insert the appointment unless a blocking-status row overlaps it.
    ///
    /// Check and insert are one atomic statement. Returns
    /// `DbError::Conflict` when the slot is already taken.
    fn insert_if_free(
        &self,
        appointment: NewAppointment,
    ) -> impl std::future::Future<Output = Result<Appointment, DbError>> + Send;

    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Appointment>, DbError>> + Send;

    /// All appointments for a practitioner in an inclusive date range,
    /// chronological.
    fn list_range(
        &self,
        practitioner_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Vec<Appointment>, DbError>> + Send;

    /// Only blocking-status rows in the range: the occupied set the slot
    /// generator subtracts.
    fn list_blocking(
        &self,
        practitioner_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Vec<Appointment>, DbError>> + Send;

    /// Blocking rows on or after a date, across all practitioners: the
    /// reminder batch population.
    fn list_upcoming_blocking(
        &self,
        from: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Vec<Appointment>, DbError>> + Send;

    /// Conditionally move a row from one status to another. NotFound if the
    /// row is missing or no longer in `from`; transitions never overwrite
    /// a state they didn't read.
    fn transition_status(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> impl std::future::Future<Output = Result<Appointment, DbError>> + Send;

    fn set_rsvp_status(
        &self,
        id: Uuid,
        rsvp: RsvpStatus,
    ) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Record a reschedule proposal and mark the RSVP as
    /// reschedule_requested. Only valid on a scheduled session.
    #[allow(clippy::too_many_arguments)]
    fn store_proposal(
        &self,
        id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        message: Option<String>,
    ) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Drop the stored proposal and return the RSVP to pending.
    fn decline_proposal(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Move the session to the proposed time unless a blocking row overlaps
    /// it (atomic, excluding the session itself). Clears the proposal and the
    /// session reminder stamps on success; `DbError::Conflict` otherwise.
    fn accept_proposal(
        &self,
        id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> impl std::future::Future<Output = Result<Appointment, DbError>> + Send;

    /// Set a reminder stamp if it is still unset. Returns false when the
    /// stamp was already present (another run got there first).
    fn stamp_reminder(
        &self,
        id: Uuid,
        kind: ReminderKind,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;
}
