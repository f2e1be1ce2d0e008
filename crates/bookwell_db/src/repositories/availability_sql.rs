//! SQL implementation of the availability repository

use crate::error::DbError;
use crate::repositories::availability::AvailabilityRepository;
use crate::repositories::codec::{fmt_date, minute_to_time, parse_date};
use crate::DbClient;
use bookwell_common::models::{BookingSettings, DateOverride, WeeklyRule};
use bookwell_common::time::minute_of_day;
use chrono::NaiveDate;
use sqlx::Row;
use tracing::{debug, error, info};
use uuid::Uuid;

/// SQL implementation of the availability repository
#[derive(Debug, Clone)]
pub struct SqlAvailabilityRepository {
    db_client: DbClient,
}

impl SqlAvailabilityRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl AvailabilityRepository for SqlAvailabilityRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing availability schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS weekly_rules (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                practitioner_id TEXT NOT NULL,
                day_of_week INTEGER NOT NULL,
                start_min INTEGER NOT NULL,
                end_min INTEGER NOT NULL,
                active INTEGER NOT NULL DEFAULT 1
            )
        "#,
            )
            .await?;

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS date_overrides (
                practitioner_id TEXT NOT NULL,
                date TEXT NOT NULL,
                is_available INTEGER NOT NULL,
                start_min INTEGER,
                end_min INTEGER,
                reason TEXT,
                PRIMARY KEY (practitioner_id, date)
            )
        "#,
            )
            .await?;

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS booking_settings (
                practitioner_id TEXT PRIMARY KEY,
                slot_duration_minutes INTEGER NOT NULL,
                buffer_minutes INTEGER NOT NULL,
                min_booking_notice_hours INTEGER NOT NULL,
                max_booking_days_ahead INTEGER NOT NULL,
                timezone TEXT NOT NULL,
                requires_approval INTEGER NOT NULL DEFAULT 0
            )
        "#,
            )
            .await?;

        info!("Availability schema initialized successfully");
        Ok(())
    }

    async fn replace_weekly_schedule(
        &self,
        practitioner_id: Uuid,
        rules: &[WeeklyRule],
    ) -> Result<(), DbError> {
        debug!(
            "Replacing weekly schedule for practitioner {} with {} rules",
            practitioner_id,
            rules.len()
        );

        let mut tx = self.db_client.begin().await?;

        sqlx::query("DELETE FROM weekly_rules WHERE practitioner_id = $1")
            .bind(practitioner_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to clear weekly schedule: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        for rule in rules {
            sqlx::query(
                r#"
                INSERT INTO weekly_rules (practitioner_id, day_of_week, start_min, end_min, active)
                VALUES ($1, $2, $3, $4, $5)
            "#,
            )
            .bind(practitioner_id.to_string())
            .bind(i64::from(rule.day_of_week))
            .bind(minute_of_day(rule.start_time))
            .bind(minute_of_day(rule.end_time))
            .bind(i64::from(rule.active))
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to insert weekly rule: {}", e);
                DbError::QueryError(e.to_string())
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        info!(
            "Weekly schedule replaced for practitioner {}",
            practitioner_id
        );
        Ok(())
    }

    async fn list_weekly_rules(&self, practitioner_id: Uuid) -> Result<Vec<WeeklyRule>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT day_of_week, start_min, end_min, active
            FROM weekly_rules
            WHERE practitioner_id = $1
            ORDER BY day_of_week, start_min
        "#,
        )
        .bind(practitioner_id.to_string())
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let day: i64 = row
                    .try_get("day_of_week")
                    .map_err(|e| DbError::MappingError(e.to_string()))?;
                Ok(WeeklyRule {
                    day_of_week: day as u8,
                    start_time: minute_to_time(
                        row.try_get("start_min")
                            .map_err(|e| DbError::MappingError(e.to_string()))?,
                    )?,
                    end_time: minute_to_time(
                        row.try_get("end_min")
                            .map_err(|e| DbError::MappingError(e.to_string()))?,
                    )?,
                    active: row.try_get::<i64, _>("active").unwrap_or(0) != 0,
                })
            })
            .collect()
    }

    async fn upsert_override(
        &self,
        practitioner_id: Uuid,
        entry: DateOverride,
    ) -> Result<DateOverride, DbError> {
        debug!(
            "Upserting override for practitioner {} on {}",
            practitioner_id, entry.date
        );

        let existing = sqlx::query(
            "SELECT date FROM date_overrides WHERE practitioner_id = $1 AND date = $2",
        )
        .bind(practitioner_id.to_string())
        .bind(fmt_date(entry.date))
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        let query = if existing.is_some() {
            r#"
                UPDATE date_overrides
                SET is_available = $3, start_min = $4, end_min = $5, reason = $6
                WHERE practitioner_id = $1 AND date = $2
            "#
        } else {
            r#"
                INSERT INTO date_overrides (practitioner_id, date, is_available, start_min, end_min, reason)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#
        };

        sqlx::query(query)
            .bind(practitioner_id.to_string())
            .bind(fmt_date(entry.date))
            .bind(i64::from(entry.is_available))
            .bind(entry.start_time.map(minute_of_day))
            .bind(entry.end_time.map(minute_of_day))
            .bind(entry.reason.clone())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to upsert date override: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(entry)
    }

    async fn list_overrides(
        &self,
        practitioner_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DateOverride>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT date, is_available, start_min, end_min, reason
            FROM date_overrides
            WHERE practitioner_id = $1 AND date >= $2 AND date <= $3
            ORDER BY date
        "#,
        )
        .bind(practitioner_id.to_string())
        .bind(fmt_date(from))
        .bind(fmt_date(to))
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let date: String = row
                    .try_get("date")
                    .map_err(|e| DbError::MappingError(e.to_string()))?;
                let start_min: Option<i64> = row.try_get("start_min").ok().flatten();
                let end_min: Option<i64> = row.try_get("end_min").ok().flatten();
                Ok(DateOverride {
                    date: parse_date(&date)?,
                    is_available: row.try_get::<i64, _>("is_available").unwrap_or(0) != 0,
                    start_time: start_min.map(minute_to_time).transpose()?,
                    end_time: end_min.map(minute_to_time).transpose()?,
                    reason: row.try_get("reason").ok().flatten(),
                })
            })
            .collect()
    }

    async fn upsert_settings(&self, settings: BookingSettings) -> Result<BookingSettings, DbError> {
        debug!(
            "Upserting booking settings for practitioner {}",
            settings.practitioner_id
        );

        let existing = sqlx::query(
            "SELECT practitioner_id FROM booking_settings WHERE practitioner_id = $1",
        )
        .bind(settings.practitioner_id.to_string())
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        let query = if existing.is_some() {
            r#"
                UPDATE booking_settings
                SET slot_duration_minutes = $2, buffer_minutes = $3,
                    min_booking_notice_hours = $4, max_booking_days_ahead = $5,
                    timezone = $6, requires_approval = $7
                WHERE practitioner_id = $1
            "#
        } else {
            r#"
                INSERT INTO booking_settings (practitioner_id, slot_duration_minutes,
                    buffer_minutes, min_booking_notice_hours, max_booking_days_ahead,
                    timezone, requires_approval)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#
        };

        sqlx::query(query)
            .bind(settings.practitioner_id.to_string())
            .bind(settings.slot_duration_minutes)
            .bind(settings.buffer_minutes)
            .bind(settings.min_booking_notice_hours)
            .bind(settings.max_booking_days_ahead)
            .bind(settings.timezone.clone())
            .bind(i64::from(settings.requires_approval))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to upsert booking settings: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(settings)
    }

    async fn get_settings(
        &self,
        practitioner_id: Uuid,
    ) -> Result<Option<BookingSettings>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT slot_duration_minutes, buffer_minutes, min_booking_notice_hours,
                   max_booking_days_ahead, timezone, requires_approval
            FROM booking_settings
            WHERE practitioner_id = $1
        "#,
        )
        .bind(practitioner_id.to_string())
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(BookingSettings {
            practitioner_id,
            slot_duration_minutes: row
                .try_get("slot_duration_minutes")
                .map_err(|e| DbError::MappingError(e.to_string()))?,
            buffer_minutes: row
                .try_get("buffer_minutes")
                .map_err(|e| DbError::MappingError(e.to_string()))?,
            min_booking_notice_hours: row
                .try_get("min_booking_notice_hours")
                .map_err(|e| DbError::MappingError(e.to_string()))?,
            max_booking_days_ahead: row
                .try_get("max_booking_days_ahead")
                .map_err(|e| DbError::MappingError(e.to_string()))?,
            timezone: row
                .try_get("timezone")
                .map_err(|e| DbError::MappingError(e.to_string()))?,
            requires_approval: row.try_get::<i64, _>("requires_approval").unwrap_or(0) != 0,
        }))
    }
}
