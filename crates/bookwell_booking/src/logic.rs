// --- File: crates/bookwell_booking/src/logic.rs ---
//! Booking creation and the conflict guard.
//!
//! Slot generation is advisory: the list a client saw can be stale the
//! moment two clients ask for the same slot. The checks here run at commit
//! time, in order, each short-circuiting: (a) the booking window, (b) the
//! slot still lies within current availability, (c) no overlap with a
//! blocking-status row. Check (c) is enforced by the ledger inside the same
//! atomic statement that inserts, so concurrent requests cannot both win.

use bookwell_availability::logic::day_windows;
use bookwell_common::models::{
    Appointment, AppointmentKind, AppointmentStatus, BookingSettings, RsvpStatus,
};
use bookwell_common::time::{local_datetime, minute_of_day, Clock, MinuteSpan};
use bookwell_db::{AvailabilityRepository, DbError, LedgerRepository, NewAppointment};
use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Error Handling ---
use thiserror::Error;
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Requested time slot is no longer available")]
    SlotNoLongerAvailable,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DbError> for BookingError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(_) => BookingError::SlotNoLongerAvailable,
            DbError::NotFound(msg) => BookingError::NotFound(msg),
            other => BookingError::DatabaseError(other.to_string()),
        }
    }
}

// --- Data Structures ---
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateBookingRequest {
    pub practitioner_id: Uuid,
    /// Date in YYYY-MM-DD format
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-05-15"))]
    pub date: String,
    /// Slot start in HH:MM format, practitioner-local
    #[cfg_attr(feature = "openapi", schema(example = "10:00"))]
    pub start_time: String,
    /// Slot end in HH:MM format, practitioner-local
    #[cfg_attr(feature = "openapi", schema(example = "11:00"))]
    pub end_time: String,
    pub client_name: String,
    pub client_email: String,
    pub notes: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingResponse {
    pub success: bool,
    pub booking_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub message: String,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateSessionStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AppointmentsQuery {
    pub practitioner_id: Uuid,
    pub start_date: String, // YYYY-MM-DD format
    pub end_date: String,   // YYYY-MM-DD format
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppointmentsResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Object>))]
    pub appointments: Vec<Appointment>,
}

/// A parsed, not-yet-validated slot request.
#[derive(Debug, Clone)]
pub struct SlotRequest {
    pub practitioner_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub client_name: String,
    pub client_email: String,
    pub notes: Option<String>,
}

// --- Validation (checks a and b) ---

/// The slot must be well-formed and exactly one configured slot long.
pub fn validate_slot_shape(
    request: &SlotRequest,
    settings: &BookingSettings,
) -> Result<(), BookingError> {
    if request.start_time >= request.end_time {
        return Err(BookingError::ValidationError(
            "start_time must be before end_time".to_string(),
        ));
    }
    let requested = minute_of_day(request.end_time) - minute_of_day(request.start_time);
    if requested != settings.slot_duration_minutes {
        return Err(BookingError::ValidationError(format!(
            "Slot must be exactly {} minutes, got {}",
            settings.slot_duration_minutes, requested
        )));
    }
    if request.client_name.trim().is_empty() || request.client_email.trim().is_empty() {
        return Err(BookingError::ValidationError(
            "client_name and client_email are required".to_string(),
        ));
    }
    Ok(())
}

/// Check (a): the slot lies inside the allowed booking window
/// [now + notice, today + max_days_ahead].
pub fn validate_booking_window(
    request: &SlotRequest,
    settings: &BookingSettings,
    now: DateTime<Utc>,
) -> Result<(), BookingError> {
    let tz = settings
        .tz()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    let slot_start = local_datetime(tz, request.date, minute_of_day(request.start_time))
        .ok_or_else(|| {
            BookingError::ValidationError("Slot start does not exist in this timezone".to_string())
        })?;
    let earliest = now + Duration::hours(settings.min_booking_notice_hours.max(0));
    if slot_start.with_timezone(&Utc) < earliest {
        return Err(BookingError::ValidationError(format!(
            "Bookings require at least {} hours notice",
            settings.min_booking_notice_hours
        )));
    }

    let today = now.with_timezone(&tz).date_naive();
    let horizon = today
        .checked_add_days(Days::new(settings.max_booking_days_ahead.max(0) as u64))
        .unwrap_or(today);
    if request.date > horizon {
        return Err(BookingError::ValidationError(format!(
            "Bookings can be made at most {} days ahead",
            settings.max_booking_days_ahead
        )));
    }

    Ok(())
}

/// Check (b): the slot still lies within a current availability window
/// (date override or weekly rule).
pub fn validate_within_availability(
    request: &SlotRequest,
    rules: &[bookwell_common::models::WeeklyRule],
    overrides: &[bookwell_common::models::DateOverride],
) -> Result<(), BookingError> {
    let windows = day_windows(rules, overrides, request.date)
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;
    let slot = MinuteSpan::from_times(request.start_time, request.end_time).ok_or_else(|| {
        BookingError::ValidationError("start_time must be before end_time".to_string())
    })?;

    if windows.iter().any(|window| window.contains(&slot)) {
        Ok(())
    } else {
        Err(BookingError::SlotNoLongerAvailable)
    }
}

// --- Booking Logic ---

/// Create a client booking.
///
/// The booking is created in PendingVerification, which already blocks, so
/// two unverified requests cannot race into the same slot. The human
/// verification step moves it to Confirmed.
pub async fn create_booking<A, L>(
    availability: &A,
    ledger: &L,
    clock: &dyn Clock,
    request: SlotRequest,
) -> Result<Appointment, BookingError>
where
    A: AvailabilityRepository + Sync,
    L: LedgerRepository + Sync,
{
    let settings = availability
        .get_settings(request.practitioner_id)
        .await?
        .ok_or_else(|| {
            BookingError::NotFound("No booking settings for practitioner".to_string())
        })?;
    let now = clock.now_utc();

    validate_slot_shape(&request, &settings)?;
    validate_booking_window(&request, &settings, now)?;

    let rules = availability
        .list_weekly_rules(request.practitioner_id)
        .await?;
    let overrides = availability
        .list_overrides(request.practitioner_id, request.date, request.date)
        .await?;
    validate_within_availability(&request, &rules, &overrides)?;

    let appointment = ledger
        .insert_if_free(NewAppointment {
            id: Uuid::new_v4(),
            practitioner_id: request.practitioner_id,
            kind: AppointmentKind::Booking,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            status: AppointmentStatus::PendingVerification,
            rsvp_status: None,
            client_name: request.client_name,
            client_email: request.client_email,
            notes: request.notes,
            created_at: now,
        })
        .await?;

    Ok(appointment)
}

/// Create a practitioner session, directly in Scheduled.
///
/// Sessions skip the notice-window and published-availability checks (the
/// practitioner is writing into their own calendar) but go through the same
/// guarded insert, so they can never overlap another blocking row.
pub async fn create_session<A, L>(
    availability: &A,
    ledger: &L,
    clock: &dyn Clock,
    request: SlotRequest,
) -> Result<Appointment, BookingError>
where
    A: AvailabilityRepository + Sync,
    L: LedgerRepository + Sync,
{
    let settings = availability
        .get_settings(request.practitioner_id)
        .await?
        .ok_or_else(|| {
            BookingError::NotFound("No booking settings for practitioner".to_string())
        })?;
    // only shape sanity here, not the client-facing window rules
    if request.start_time >= request.end_time {
        return Err(BookingError::ValidationError(
            "start_time must be before end_time".to_string(),
        ));
    }
    settings
        .tz()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    let appointment = ledger
        .insert_if_free(NewAppointment {
            id: Uuid::new_v4(),
            practitioner_id: request.practitioner_id,
            kind: AppointmentKind::Session,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            status: AppointmentStatus::Scheduled,
            rsvp_status: Some(RsvpStatus::Pending),
            client_name: request.client_name,
            client_email: request.client_email,
            notes: request.notes,
            created_at: clock.now_utc(),
        })
        .await?;

    Ok(appointment)
}

/// The verification step: PendingVerification -> Confirmed.
pub async fn verify_booking<L>(ledger: &L, id: Uuid) -> Result<Appointment, BookingError>
where
    L: LedgerRepository + Sync,
{
    Ok(ledger
        .transition_status(
            id,
            AppointmentStatus::PendingVerification,
            AppointmentStatus::Confirmed,
        )
        .await?)
}

/// Cancel a booking or session from whatever blocking state it is in.
pub async fn cancel_appointment<L>(ledger: &L, id: Uuid) -> Result<Appointment, BookingError>
where
    L: LedgerRepository + Sync,
{
    let appointment = ledger
        .find_by_id(id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Appointment {id} not found")))?;

    if !appointment
        .status
        .can_transition_to(AppointmentStatus::Cancelled)
    {
        return Err(BookingError::ValidationError(format!(
            "Cannot cancel an appointment in status {}",
            appointment.status.as_str()
        )));
    }

    Ok(ledger
        .transition_status(id, appointment.status, AppointmentStatus::Cancelled)
        .await?)
}

/// Move a session to a terminal state (completed, cancelled, no_show).
pub async fn update_session_status<L>(
    ledger: &L,
    id: Uuid,
    next: AppointmentStatus,
) -> Result<Appointment, BookingError>
where
    L: LedgerRepository + Sync,
{
    let appointment = ledger
        .find_by_id(id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Appointment {id} not found")))?;

    if appointment.kind != AppointmentKind::Session {
        return Err(BookingError::ValidationError(
            "Only sessions can be moved to a session state".to_string(),
        ));
    }
    if !appointment.status.can_transition_to(next) {
        return Err(BookingError::ValidationError(format!(
            "Illegal transition from {} to {}",
            appointment.status.as_str(),
            next.as_str()
        )));
    }

    Ok(ledger
        .transition_status(id, appointment.status, next)
        .await?)
}
