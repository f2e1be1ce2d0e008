// --- File: crates/bookwell_reminders/src/logic.rs ---
//! The reminder batch.
//!
//! Per reminder kind the state machine is `not_due -> due -> sent`. "Due" is
//! a computed predicate over the appointment row and the current instant,
//! never a stored flag, and each kind's sent-at stamp is what moves an item
//! to `sent`. The batch is driven externally (cron hitting the trigger
//! endpoint) and is safe to re-run at any cadence: an item is dispatched at
//! most once per kind under normal operation, and a failed dispatch leaves
//! the stamp unset so the next run retries it.

use bookwell_common::models::{
    Appointment, AppointmentKind, AppointmentStatus, ReminderKind, RsvpStatus,
};
use bookwell_common::services::NotificationService;
use bookwell_common::time::{hours_between, local_datetime, minute_of_day, Clock};
use bookwell_common::BookwellError;
use bookwell_config::RemindersConfig;
use bookwell_db::{AvailabilityRepository, LedgerRepository};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// An RSVP nag is pointless once the session is imminent.
const RSVP_MIN_HOURS_BEFORE_SESSION: f64 = 12.0;

/// Thresholds and switches, resolved from RemindersConfig once per batch.
#[derive(Debug, Clone)]
pub struct ReminderRules {
    pub rsvp_first_hours: i64,
    pub rsvp_second_hours: i64,
    /// Half-width of the window around the 24h/1h marks, in minutes.
    pub tolerance_minutes: i64,
    pub enable_rsvp_first: bool,
    pub enable_rsvp_second: bool,
    pub enable_session_24h: bool,
    pub enable_session_1h: bool,
}

impl From<&RemindersConfig> for ReminderRules {
    fn from(config: &RemindersConfig) -> Self {
        Self {
            rsvp_first_hours: config.rsvp_first_hours,
            rsvp_second_hours: config.rsvp_second_hours,
            tolerance_minutes: config.session_tolerance_minutes,
            enable_rsvp_first: config.enable_rsvp_first,
            enable_rsvp_second: config.enable_rsvp_second,
            enable_session_24h: config.enable_session_24h,
            enable_session_1h: config.enable_session_1h,
        }
    }
}

impl Default for ReminderRules {
    fn default() -> Self {
        Self::from(&RemindersConfig::default())
    }
}

/// The instant an appointment starts, resolved from its practitioner-local
/// date and time.
pub fn appointment_start_utc(appointment: &Appointment, tz: Tz) -> Option<DateTime<Utc>> {
    local_datetime(
        tz,
        appointment.date,
        minute_of_day(appointment.start_time),
    )
    .map(|dt| dt.with_timezone(&Utc))
}

fn stamp_of(appointment: &Appointment, kind: ReminderKind) -> Option<DateTime<Utc>> {
    match kind {
        ReminderKind::RsvpFirst => appointment.rsvp_first_sent_at,
        ReminderKind::RsvpSecond => appointment.rsvp_second_sent_at,
        ReminderKind::Session24h => appointment.session_24h_sent_at,
        ReminderKind::Session1h => appointment.session_1h_sent_at,
    }
}

fn kind_enabled(rules: &ReminderRules, kind: ReminderKind) -> bool {
    match kind {
        ReminderKind::RsvpFirst => rules.enable_rsvp_first,
        ReminderKind::RsvpSecond => rules.enable_rsvp_second,
        ReminderKind::Session24h => rules.enable_session_24h,
        ReminderKind::Session1h => rules.enable_session_1h,
    }
}

/// All reminder kinds currently due for one appointment.
///
/// RSVP kinds apply to scheduled sessions whose RSVP is still pending: due
/// once the configured number of hours has elapsed since creation, while the
/// session is still at least 12 hours away. Pre-session kinds apply to
/// scheduled sessions and confirmed bookings: due while `hours until start`
/// sits inside the tolerance window around the 24h/1h mark, which absorbs
/// irregular trigger cadence. A disabled kind is never computed as due.
pub fn due_kinds(
    appointment: &Appointment,
    tz: Tz,
    rules: &ReminderRules,
    now: DateTime<Utc>,
) -> Vec<ReminderKind> {
    let Some(start) = appointment_start_utc(appointment, tz) else {
        return vec![];
    };
    let hours_until_start = hours_between(now, start);
    let hours_elapsed = hours_between(appointment.created_at, now);
    let tolerance_hours = rules.tolerance_minutes as f64 / 60.0;

    let rsvp_eligible = appointment.kind == AppointmentKind::Session
        && appointment.status == AppointmentStatus::Scheduled
        && appointment.rsvp_status == Some(RsvpStatus::Pending);
    let session_eligible = appointment.status == AppointmentStatus::Scheduled
        || appointment.status == AppointmentStatus::Confirmed;

    let mut due = Vec::new();
    for kind in ReminderKind::ALL {
        if !kind_enabled(rules, kind) {
            continue;
        }
        if stamp_of(appointment, kind).is_some() {
            continue;
        }
        let is_due = match kind {
            ReminderKind::RsvpFirst => {
                rsvp_eligible
                    && hours_elapsed >= rules.rsvp_first_hours as f64
                    && hours_until_start >= RSVP_MIN_HOURS_BEFORE_SESSION
            }
            ReminderKind::RsvpSecond => {
                rsvp_eligible
                    && hours_elapsed >= rules.rsvp_second_hours as f64
                    && hours_until_start >= RSVP_MIN_HOURS_BEFORE_SESSION
            }
            ReminderKind::Session24h => {
                session_eligible
                    && hours_until_start >= 24.0 - tolerance_hours
                    && hours_until_start <= 24.0 + tolerance_hours
            }
            ReminderKind::Session1h => {
                session_eligible
                    && hours_until_start >= 1.0 - tolerance_hours
                    && hours_until_start <= 1.0 + tolerance_hours
            }
        };
        if is_due {
            due.push(kind);
        }
    }
    due
}

/// Subject and body for one reminder, times rendered practitioner-local.
pub fn render_reminder(appointment: &Appointment, kind: ReminderKind, tz: Tz) -> (String, String) {
    let when = appointment_start_utc(appointment, tz)
        .map(|start| {
            start
                .with_timezone(&tz)
                .format("%A, %B %e at %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| appointment.date.to_string());

    match kind {
        ReminderKind::RsvpFirst | ReminderKind::RsvpSecond => (
            "Please confirm your appointment".to_string(),
            format!(
                "Hi {},\n\nYour session on {} is still awaiting your confirmation. \
                 Please accept, decline, or propose another time.\n",
                appointment.client_name, when
            ),
        ),
        ReminderKind::Session24h => (
            "Your appointment is tomorrow".to_string(),
            format!(
                "Hi {},\n\nThis is a reminder that your appointment is on {}.\n",
                appointment.client_name, when
            ),
        ),
        ReminderKind::Session1h => (
            "Your appointment starts soon".to_string(),
            format!(
                "Hi {},\n\nYour appointment starts at {}.\n",
                appointment.client_name, when
            ),
        ),
    }
}

// --- Batch Result ---

#[derive(Serialize, Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SentCounts {
    pub rsvp_first: usize,
    pub rsvp_second: usize,
    pub session_24h: usize,
    pub session_1h: usize,
}

impl SentCounts {
    fn bump(&mut self, kind: ReminderKind) {
        match kind {
            ReminderKind::RsvpFirst => self.rsvp_first += 1,
            ReminderKind::RsvpSecond => self.rsvp_second += 1,
            ReminderKind::Session24h => self.session_24h += 1,
            ReminderKind::Session1h => self.session_1h += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.rsvp_first + self.rsvp_second + self.session_24h + self.session_1h
    }
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReminderItemError {
    pub appointment_id: Uuid,
    pub kind: ReminderKind,
    pub error: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReminderBatchSummary {
    pub scanned: usize,
    pub sent: SentCounts,
    pub errors: Vec<ReminderItemError>,
}

// --- Batch Logic ---

/// Scan the outstanding blocking appointments and dispatch every due
/// reminder at most once.
///
/// Items are independent; a dispatch failure is recorded in the summary and
/// never aborts the batch, and its stamp stays unset so the next run
/// retries. The stamp is written after the send: a crash between the two
/// can duplicate a single delivery, a tradeoff taken for simplicity over a
/// transactional outbox.
pub async fn run_reminder_batch<L, A, N>(
    ledger: &L,
    availability: &A,
    notifier: &N,
    clock: &dyn Clock,
    rules: &ReminderRules,
) -> Result<ReminderBatchSummary, BookwellError>
where
    L: LedgerRepository + Sync,
    A: AvailabilityRepository + Sync,
    N: NotificationService,
{
    let now = clock.now_utc();
    // one day of slack so a practitioner ahead of UTC never loses today's rows
    let from = (now - Duration::days(1)).date_naive();
    let appointments = ledger.list_upcoming_blocking(from).await.map_err(BookwellError::from)?;

    let mut timezones: HashMap<Uuid, Option<Tz>> = HashMap::new();
    let mut summary = ReminderBatchSummary {
        scanned: appointments.len(),
        sent: SentCounts::default(),
        errors: Vec::new(),
    };

    for appointment in &appointments {
        let tz = match timezones.get(&appointment.practitioner_id) {
            Some(cached) => *cached,
            None => {
                let tz = availability
                    .get_settings(appointment.practitioner_id)
                    .await
                    .map_err(BookwellError::from)?
                    .and_then(|s| s.tz().ok());
                timezones.insert(appointment.practitioner_id, tz);
                tz
            }
        };
        let Some(tz) = tz else {
            warn!(
                "Skipping reminders for practitioner {} without usable settings",
                appointment.practitioner_id
            );
            continue;
        };

        for kind in due_kinds(appointment, tz, rules, now) {
            let (subject, body) = render_reminder(appointment, kind, tz);
            match notifier
                .send_email(&appointment.client_email, &subject, &body)
                .await
            {
                Ok(_) => {
                    // stamp-after-send; a false return means another run
                    // stamped first, so we don't double-count
                    if ledger
                        .stamp_reminder(appointment.id, kind, now)
                        .await
                        .map_err(BookwellError::from)?
                    {
                        debug!("Sent {} reminder for {}", kind.as_str(), appointment.id);
                        summary.sent.bump(kind);
                    }
                }
                Err(e) => {
                    warn!(
                        "Failed to dispatch {} reminder for {}: {}",
                        kind.as_str(),
                        appointment.id,
                        e
                    );
                    summary.errors.push(ReminderItemError {
                        appointment_id: appointment.id,
                        kind,
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    Ok(summary)
}
