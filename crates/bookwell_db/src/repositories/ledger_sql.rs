//! SQL implementation of the booking ledger

use crate::error::DbError;
use crate::repositories::codec::{fmt_date, fmt_instant, minute_to_time, parse_date, parse_instant, parse_uuid};
use crate::repositories::ledger::{LedgerRepository, NewAppointment};
use crate::DbClient;
use bookwell_common::models::{Appointment, AppointmentStatus, ReminderKind, RsvpStatus};
use bookwell_common::time::minute_of_day;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Status list that occupies a slot, as an SQL tuple. Must stay in sync with
/// `AppointmentStatus::is_blocking`.
const BLOCKING_STATUSES: &str = "('pending_verification', 'confirmed', 'scheduled')";

const APPOINTMENT_COLUMNS: &str = r#"id, practitioner_id, kind, date, start_min, end_min,
    status, rsvp_status, client_name, client_email, notes, created_at,
    rsvp_first_sent_at, rsvp_second_sent_at, session_24h_sent_at, session_1h_sent_at,
    proposed_date, proposed_start_min, proposed_end_min, proposal_message"#;

/// SQL implementation of the booking ledger
#[derive(Debug, Clone)]
pub struct SqlLedgerRepository {
    db_client: DbClient,
}

impl SqlLedgerRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    fn map_row(row: &AnyRow) -> Result<Appointment, DbError> {
        let get_text = |name: &str| -> Result<String, DbError> {
            row.try_get::<String, _>(name)
                .map_err(|e| DbError::MappingError(format!("{name}: {e}")))
        };
        let get_opt_text = |name: &str| -> Option<String> {
            row.try_get::<Option<String>, _>(name).ok().flatten()
        };
        let get_min = |name: &str| -> Result<NaiveTime, DbError> {
            minute_to_time(
                row.try_get::<i64, _>(name)
                    .map_err(|e| DbError::MappingError(format!("{name}: {e}")))?,
            )
        };

        let rsvp_status = get_opt_text("rsvp_status")
            .map(|s| {
                s.parse::<RsvpStatus>()
                    .map_err(|e| DbError::MappingError(e.to_string()))
            })
            .transpose()?;

        let parse_stamp = |name: &str| -> Result<Option<DateTime<Utc>>, DbError> {
            get_opt_text(name).map(|s| parse_instant(&s)).transpose()
        };

        let proposed_start_min = row
            .try_get::<Option<i64>, _>("proposed_start_min")
            .ok()
            .flatten();
        let proposed_end_min = row
            .try_get::<Option<i64>, _>("proposed_end_min")
            .ok()
            .flatten();

        Ok(Appointment {
            id: parse_uuid(&get_text("id")?)?,
            practitioner_id: parse_uuid(&get_text("practitioner_id")?)?,
            kind: get_text("kind")?
                .parse()
                .map_err(|e: bookwell_common::BookwellError| DbError::MappingError(e.to_string()))?,
            date: parse_date(&get_text("date")?)?,
            start_time: get_min("start_min")?,
            end_time: get_min("end_min")?,
            status: get_text("status")?
                .parse()
                .map_err(|e: bookwell_common::BookwellError| DbError::MappingError(e.to_string()))?,
            rsvp_status,
            client_name: get_text("client_name")?,
            client_email: get_text("client_email")?,
            notes: get_opt_text("notes"),
            created_at: parse_instant(&get_text("created_at")?)?,
            rsvp_first_sent_at: parse_stamp("rsvp_first_sent_at")?,
            rsvp_second_sent_at: parse_stamp("rsvp_second_sent_at")?,
            session_24h_sent_at: parse_stamp("session_24h_sent_at")?,
            session_1h_sent_at: parse_stamp("session_1h_sent_at")?,
            proposed_date: get_opt_text("proposed_date")
                .map(|s| parse_date(&s))
                .transpose()?,
            proposed_start_time: proposed_start_min.map(minute_to_time).transpose()?,
            proposed_end_time: proposed_end_min.map(minute_to_time).transpose()?,
            proposal_message: get_opt_text("proposal_message"),
        })
    }

    fn stamp_column(kind: ReminderKind) -> &'static str {
        match kind {
            ReminderKind::RsvpFirst => "rsvp_first_sent_at",
            ReminderKind::RsvpSecond => "rsvp_second_sent_at",
            ReminderKind::Session24h => "session_24h_sent_at",
            ReminderKind::Session1h => "session_1h_sent_at",
        }
    }
}

impl LedgerRepository for SqlLedgerRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing ledger schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id TEXT PRIMARY KEY,
                practitioner_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                date TEXT NOT NULL,
                start_min INTEGER NOT NULL,
                end_min INTEGER NOT NULL,
                status TEXT NOT NULL,
                rsvp_status TEXT,
                client_name TEXT NOT NULL,
                client_email TEXT NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL,
                rsvp_first_sent_at TEXT,
                rsvp_second_sent_at TEXT,
                session_24h_sent_at TEXT,
                session_1h_sent_at TEXT,
                proposed_date TEXT,
                proposed_start_min INTEGER,
                proposed_end_min INTEGER,
                proposal_message TEXT
            )
        "#,
            )
            .await?;

        self.db_client
            .execute(
                r#"
            CREATE INDEX IF NOT EXISTS idx_appointments_practitioner_date
            ON appointments (practitioner_id, date)
        "#,
            )
            .await?;

        info!("Ledger schema initialized successfully");
        Ok(())
    }

    async fn insert_if_free(&self, appointment: NewAppointment) -> Result<Appointment, DbError> {
        debug!(
            "Guarded insert for practitioner {} on {} [{} - {}]",
            appointment.practitioner_id,
            appointment.date,
            appointment.start_time,
            appointment.end_time
        );

        // The overlap check and the insert are one statement, so concurrent
        // requests for the same slot are serialized by the store: exactly one
        // of them inserts a row, the rest affect zero rows.
        let query = format!(
            r#"
            INSERT INTO appointments (id, practitioner_id, kind, date, start_min, end_min,
                status, rsvp_status, client_name, client_email, notes, created_at)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12
            WHERE NOT EXISTS (
                SELECT 1 FROM appointments
                WHERE practitioner_id = $2
                  AND date = $4
                  AND status IN {BLOCKING_STATUSES}
                  AND start_min < $6 AND end_min > $5
            )
        "#
        );

        let result = sqlx::query(&query)
            .bind(appointment.id.to_string())
            .bind(appointment.practitioner_id.to_string())
            .bind(appointment.kind.as_str())
            .bind(fmt_date(appointment.date))
            .bind(minute_of_day(appointment.start_time))
            .bind(minute_of_day(appointment.end_time))
            .bind(appointment.status.as_str())
            .bind(appointment.rsvp_status.map(|r| r.as_str()))
            .bind(appointment.client_name.clone())
            .bind(appointment.client_email.clone())
            .bind(appointment.notes.clone())
            .bind(fmt_instant(appointment.created_at))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Guarded insert failed: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            warn!(
                "Slot already taken for practitioner {} on {}",
                appointment.practitioner_id, appointment.date
            );
            return Err(DbError::Conflict(
                "An overlapping appointment already exists".to_string(),
            ));
        }

        Ok(Appointment {
            id: appointment.id,
            practitioner_id: appointment.practitioner_id,
            kind: appointment.kind,
            date: appointment.date,
            start_time: appointment.start_time,
            end_time: appointment.end_time,
            status: appointment.status,
            rsvp_status: appointment.rsvp_status,
            client_name: appointment.client_name,
            client_email: appointment.client_email,
            notes: appointment.notes,
            created_at: appointment.created_at,
            rsvp_first_sent_at: None,
            rsvp_second_sent_at: None,
            session_24h_sent_at: None,
            session_1h_sent_at: None,
            proposed_date: None,
            proposed_start_time: None,
            proposed_end_time: None,
            proposal_message: None,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, DbError> {
        let query = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list_range(
        &self,
        practitioner_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, DbError> {
        let query = format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS} FROM appointments
            WHERE practitioner_id = $1 AND date >= $2 AND date <= $3
            ORDER BY date, start_min
        "#
        );
        let rows = sqlx::query(&query)
            .bind(practitioner_id.to_string())
            .bind(fmt_date(from))
            .bind(fmt_date(to))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn list_blocking(
        &self,
        practitioner_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, DbError> {
        let query = format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS} FROM appointments
            WHERE practitioner_id = $1 AND date >= $2 AND date <= $3
              AND status IN {BLOCKING_STATUSES}
            ORDER BY date, start_min
        "#
        );
        let rows = sqlx::query(&query)
            .bind(practitioner_id.to_string())
            .bind(fmt_date(from))
            .bind(fmt_date(to))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn list_upcoming_blocking(&self, from: NaiveDate) -> Result<Vec<Appointment>, DbError> {
        let query = format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS} FROM appointments
            WHERE date >= $1 AND status IN {BLOCKING_STATUSES}
            ORDER BY date, start_min
        "#
        );
        let rows = sqlx::query(&query)
            .bind(fmt_date(from))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<Appointment, DbError> {
        debug!("Transition {} from {} to {}", id, from.as_str(), to.as_str());

        let result = sqlx::query("UPDATE appointments SET status = $3 WHERE id = $1 AND status = $2")
            .bind(id.to_string())
            .bind(from.as_str())
            .bind(to.as_str())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!(
                "Appointment {id} not found in status {}",
                from.as_str()
            )));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Appointment {id} vanished after update")))
    }

    async fn set_rsvp_status(&self, id: Uuid, rsvp: RsvpStatus) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE appointments SET rsvp_status = $2 WHERE id = $1")
            .bind(id.to_string())
            .bind(rsvp.as_str())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Appointment {id} not found")));
        }
        Ok(())
    }

    async fn store_proposal(
        &self,
        id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        message: Option<String>,
    ) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET rsvp_status = 'reschedule_requested',
                proposed_date = $2, proposed_start_min = $3, proposed_end_min = $4,
                proposal_message = $5
            WHERE id = $1 AND status = 'scheduled'
        "#,
        )
        .bind(id.to_string())
        .bind(fmt_date(date))
        .bind(minute_of_day(start_time))
        .bind(minute_of_day(end_time))
        .bind(message)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!(
                "Appointment {id} not found or not a scheduled session"
            )));
        }
        Ok(())
    }

    async fn decline_proposal(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET rsvp_status = 'pending',
                proposed_date = NULL, proposed_start_min = NULL, proposed_end_min = NULL,
                proposal_message = NULL
            WHERE id = $1 AND rsvp_status = 'reschedule_requested'
        "#,
        )
        .bind(id.to_string())
        .execute(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!(
                "Appointment {id} has no pending reschedule proposal"
            )));
        }
        Ok(())
    }

    async fn accept_proposal(
        &self,
        id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Appointment, DbError> {
        debug!("Accepting reschedule proposal for {}", id);

        // Same one-statement guard as insert_if_free, excluding the session
        // itself. The session reminder stamps are cleared so the 24h/1h
        // reminders fire again for the new start time.
        let query = format!(
            r#"
            UPDATE appointments
            SET date = $2, start_min = $3, end_min = $4,
                rsvp_status = 'accepted',
                proposed_date = NULL, proposed_start_min = NULL, proposed_end_min = NULL,
                proposal_message = NULL,
                session_24h_sent_at = NULL, session_1h_sent_at = NULL
            WHERE id = $1 AND status = 'scheduled'
              AND NOT EXISTS (
                  SELECT 1 FROM appointments other
                  WHERE other.practitioner_id = appointments.practitioner_id
                    AND other.id <> appointments.id
                    AND other.date = $2
                    AND other.status IN {BLOCKING_STATUSES}
                    AND other.start_min < $4 AND other.end_min > $3
              )
        "#
        );

        let result = sqlx::query(&query)
            .bind(id.to_string())
            .bind(fmt_date(date))
            .bind(minute_of_day(start_time))
            .bind(minute_of_day(end_time))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        if result.rows_affected() == 0 {
            // Zero rows means either the session is gone or the proposed time
            // is taken; look once more to report the right error.
            return match self.find_by_id(id).await? {
                Some(appt) if appt.status == AppointmentStatus::Scheduled => {
                    warn!("Proposed time for {} now overlaps another appointment", id);
                    Err(DbError::Conflict(
                        "The proposed time is no longer available".to_string(),
                    ))
                }
                _ => Err(DbError::NotFound(format!(
                    "Appointment {id} not found or not a scheduled session"
                ))),
            };
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Appointment {id} vanished after update")))
    }

    async fn stamp_reminder(
        &self,
        id: Uuid,
        kind: ReminderKind,
        at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let column = Self::stamp_column(kind);
        let query =
            format!("UPDATE appointments SET {column} = $2 WHERE id = $1 AND {column} IS NULL");

        let result = sqlx::query(&query)
            .bind(id.to_string())
            .bind(fmt_instant(at))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
