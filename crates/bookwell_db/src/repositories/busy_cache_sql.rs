//! SQL implementation of the busy-time cache

use crate::error::DbError;
use crate::repositories::busy_cache::BusyCacheRepository;
use crate::repositories::codec::{fmt_instant, parse_instant};
use crate::DbClient;
use bookwell_common::models::{BusyInterval, CalendarLink};
use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::{debug, error, info};
use uuid::Uuid;

/// SQL implementation of the busy-time cache
#[derive(Debug, Clone)]
pub struct SqlBusyCacheRepository {
    db_client: DbClient,
}

impl SqlBusyCacheRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl BusyCacheRepository for SqlBusyCacheRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing busy-cache schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS busy_intervals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                practitioner_id TEXT NOT NULL,
                provider TEXT NOT NULL,
                start_at TEXT NOT NULL,
                end_at TEXT NOT NULL
            )
        "#,
            )
            .await?;

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS calendar_links (
                practitioner_id TEXT NOT NULL,
                provider TEXT NOT NULL,
                calendar_ref TEXT NOT NULL,
                PRIMARY KEY (practitioner_id, provider, calendar_ref)
            )
        "#,
            )
            .await?;

        info!("Busy-cache schema initialized successfully");
        Ok(())
    }

    async fn replace_intervals(
        &self,
        practitioner_id: Uuid,
        provider: &str,
        intervals: &[(DateTime<Utc>, DateTime<Utc>)],
    ) -> Result<(), DbError> {
        debug!(
            "Replacing {} cached busy intervals for practitioner {} from {}",
            intervals.len(),
            practitioner_id,
            provider
        );

        let mut tx = self.db_client.begin().await?;

        sqlx::query("DELETE FROM busy_intervals WHERE practitioner_id = $1 AND provider = $2")
            .bind(practitioner_id.to_string())
            .bind(provider)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to clear busy cache: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        for (start, end) in intervals {
            sqlx::query(
                r#"
                INSERT INTO busy_intervals (practitioner_id, provider, start_at, end_at)
                VALUES ($1, $2, $3, $4)
            "#,
            )
            .bind(practitioner_id.to_string())
            .bind(provider)
            .bind(fmt_instant(*start))
            .bind(fmt_instant(*end))
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to insert busy interval: {}", e);
                DbError::QueryError(e.to_string())
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        Ok(())
    }

    async fn list_busy(
        &self,
        practitioner_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, DbError> {
        // Fixed-width RFC3339 UTC makes these TEXT comparisons chronological
        let rows = sqlx::query(
            r#"
            SELECT provider, start_at, end_at
            FROM busy_intervals
            WHERE practitioner_id = $1 AND end_at > $2 AND start_at < $3
            ORDER BY start_at
        "#,
        )
        .bind(practitioner_id.to_string())
        .bind(fmt_instant(from))
        .bind(fmt_instant(to))
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let start: String = row
                    .try_get("start_at")
                    .map_err(|e| DbError::MappingError(e.to_string()))?;
                let end: String = row
                    .try_get("end_at")
                    .map_err(|e| DbError::MappingError(e.to_string()))?;
                Ok(BusyInterval {
                    provider: row
                        .try_get("provider")
                        .map_err(|e| DbError::MappingError(e.to_string()))?,
                    start: parse_instant(&start)?,
                    end: parse_instant(&end)?,
                })
            })
            .collect()
    }

    async fn upsert_calendar_link(
        &self,
        practitioner_id: Uuid,
        link: CalendarLink,
    ) -> Result<(), DbError> {
        let existing = sqlx::query(
            r#"
            SELECT calendar_ref FROM calendar_links
            WHERE practitioner_id = $1 AND provider = $2 AND calendar_ref = $3
        "#,
        )
        .bind(practitioner_id.to_string())
        .bind(link.provider.clone())
        .bind(link.calendar_ref.clone())
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        if existing.is_some() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO calendar_links (practitioner_id, provider, calendar_ref)
            VALUES ($1, $2, $3)
        "#,
        )
        .bind(practitioner_id.to_string())
        .bind(link.provider)
        .bind(link.calendar_ref)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to insert calendar link: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        Ok(())
    }

    async fn list_calendar_links(
        &self,
        practitioner_id: Uuid,
    ) -> Result<Vec<CalendarLink>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT provider, calendar_ref FROM calendar_links
            WHERE practitioner_id = $1
            ORDER BY provider, calendar_ref
        "#,
        )
        .bind(practitioner_id.to_string())
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                Ok(CalendarLink {
                    provider: row
                        .try_get("provider")
                        .map_err(|e| DbError::MappingError(e.to_string()))?,
                    calendar_ref: row
                        .try_get("calendar_ref")
                        .map_err(|e| DbError::MappingError(e.to_string()))?,
                })
            })
            .collect()
    }
}
