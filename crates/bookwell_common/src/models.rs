// --- File: crates/bookwell_common/src/models.rs ---
//! Domain models shared across the Bookwell crates.
//!
//! Statuses are closed enums so that illegal transitions are unrepresentable
//! at the call sites that perform them; the string forms exist only at the
//! storage and serialization boundaries.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::BookwellError;

/// Whether a ledger row was created by a client (booking) or directly by the
/// practitioner (session).
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    Booking,
    Session,
}

impl AppointmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentKind::Booking => "booking",
            AppointmentKind::Session => "session",
        }
    }
}

impl FromStr for AppointmentKind {
    type Err = BookwellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booking" => Ok(AppointmentKind::Booking),
            "session" => Ok(AppointmentKind::Session),
            other => Err(BookwellError::ValidationError(format!(
                "Unknown appointment kind: {other}"
            ))),
        }
    }
}

/// Lifecycle state of a booking or session.
///
/// Bookings start in `PendingVerification` and move to `Confirmed` or
/// `Cancelled`. Sessions start in `Scheduled` and move to `Completed`,
/// `Cancelled` or `NoShow`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    PendingVerification,
    Confirmed,
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// A blocking status occupies its time range: no other blocking row may
    /// overlap it. An unverified booking already blocks, so two unverified
    /// requests cannot race into the same slot.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::PendingVerification
                | AppointmentStatus::Confirmed
                | AppointmentStatus::Scheduled
        )
    }

    /// Valid transitions of the two lifecycles. Everything else is rejected.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (PendingVerification, Confirmed)
                | (PendingVerification, Cancelled)
                | (Confirmed, Cancelled)
                | (Scheduled, Completed)
                | (Scheduled, Cancelled)
                | (Scheduled, NoShow)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::PendingVerification => "pending_verification",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = BookwellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_verification" => Ok(AppointmentStatus::PendingVerification),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "no_show" => Ok(AppointmentStatus::NoShow),
            other => Err(BookwellError::ValidationError(format!(
                "Unknown appointment status: {other}"
            ))),
        }
    }
}

/// RSVP state of a session, driven by the reminder/negotiation flow.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Pending,
    Accepted,
    Declined,
    RescheduleRequested,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Pending => "pending",
            RsvpStatus::Accepted => "accepted",
            RsvpStatus::Declined => "declined",
            RsvpStatus::RescheduleRequested => "reschedule_requested",
        }
    }
}

impl FromStr for RsvpStatus {
    type Err = BookwellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RsvpStatus::Pending),
            "accepted" => Ok(RsvpStatus::Accepted),
            "declined" => Ok(RsvpStatus::Declined),
            "reschedule_requested" => Ok(RsvpStatus::RescheduleRequested),
            other => Err(BookwellError::ValidationError(format!(
                "Unknown RSVP status: {other}"
            ))),
        }
    }
}

/// The reminder kinds the batch can dispatch. Each kind has its own sent-at
/// stamp on the appointment row; "due" is always computed, never stored.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    RsvpFirst,
    RsvpSecond,
    Session24h,
    Session1h,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 4] = [
        ReminderKind::RsvpFirst,
        ReminderKind::RsvpSecond,
        ReminderKind::Session24h,
        ReminderKind::Session1h,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::RsvpFirst => "rsvp_first",
            ReminderKind::RsvpSecond => "rsvp_second",
            ReminderKind::Session24h => "session_24h",
            ReminderKind::Session1h => "session_1h",
        }
    }
}

/// One recurring weekly availability window.
///
/// `day_of_week` follows chrono's numbering from Monday: 0 = Monday through
/// 6 = Sunday. The schedule editor replaces the whole week on save, so rules
/// carry no identity of their own.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyRule {
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub active: bool,
}

/// A date-specific exception to the weekly schedule.
///
/// `is_available = false` blocks the whole date. `is_available = true`
/// replaces the weekly rules with the given window; both times are then
/// required (validated at the edge, never defaulted).
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOverride {
    pub date: NaiveDate,
    pub is_available: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
}

/// A busy window imported from an external calendar. Cache-only: the rows for
/// a (practitioner, provider) pair are fully replaced on every sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub provider: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Which external calendar a practitioner's busy sync pulls from.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarLink {
    pub provider: String,
    pub calendar_ref: String,
}

/// A row of the booking ledger. Times are practitioner-local; the settings
/// row carries the timezone they are interpreted in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
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
    pub rsvp_first_sent_at: Option<DateTime<Utc>>,
    pub rsvp_second_sent_at: Option<DateTime<Utc>>,
    pub session_24h_sent_at: Option<DateTime<Utc>>,
    pub session_1h_sent_at: Option<DateTime<Utc>>,
    pub proposed_date: Option<NaiveDate>,
    pub proposed_start_time: Option<NaiveTime>,
    pub proposed_end_time: Option<NaiveTime>,
    pub proposal_message: Option<String>,
}

/// Per-practitioner scheduling knobs. Read-only to the engine.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSettings {
    pub practitioner_id: Uuid,
    pub slot_duration_minutes: i64,
    pub buffer_minutes: i64,
    pub min_booking_notice_hours: i64,
    pub max_booking_days_ahead: i64,
    /// IANA timezone name, e.g. "Europe/Zurich".
    pub timezone: String,
    pub requires_approval: bool,
}

impl BookingSettings {
    /// Parse the configured timezone. All slot and reminder arithmetic runs
    /// in this frame.
    pub fn tz(&self) -> Result<Tz, BookwellError> {
        Tz::from_str(&self.timezone).map_err(|_| {
            BookwellError::ValidationError(format!("Invalid timezone: {}", self.timezone))
        })
    }
}
