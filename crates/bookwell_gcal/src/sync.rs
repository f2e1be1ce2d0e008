// --- File: crates/bookwell_gcal/src/sync.rs ---
//! The busy-time sync cycle.
//!
//! Pull-based: on each trigger the provider is queried for every linked
//! calendar over the booking horizon and the cache rows for (practitioner,
//! provider) are swapped in one transaction. A fetch failure skips the
//! replacement entirely and the stale cache stays in place: staleness can
//! hide slots for a sync period but can never double-book, because the
//! ledger backs the conflict guard.

use bookwell_common::services::BusyTimeProvider;
use bookwell_common::time::Clock;
use bookwell_common::BookwellError;
use bookwell_db::{AvailabilityRepository, BusyCacheRepository};
use chrono::Duration;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Horizon used when the practitioner has no settings row yet.
const DEFAULT_HORIZON_DAYS: i64 = 60;

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CalendarSyncOutcome {
    pub calendar_ref: String,
    pub intervals: usize,
    pub error: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SyncReport {
    pub practitioner_id: Uuid,
    pub provider: String,
    pub cache_replaced: bool,
    pub outcomes: Vec<CalendarSyncOutcome>,
}

/// Fetch busy intervals for every calendar the practitioner linked to this
/// provider and replace the cache partition, or retain it on failure.
pub async fn sync_busy_for_practitioner<P, B, A>(
    provider: &P,
    busy_cache: &B,
    availability: &A,
    clock: &dyn Clock,
    practitioner_id: Uuid,
) -> Result<SyncReport, BookwellError>
where
    P: BusyTimeProvider,
    B: BusyCacheRepository + Sync,
    A: AvailabilityRepository + Sync,
{
    let now = clock.now_utc();
    let horizon_days = availability
        .get_settings(practitioner_id)
        .await
        .map_err(BookwellError::from)?
        .map(|s| s.max_booking_days_ahead)
        .unwrap_or(DEFAULT_HORIZON_DAYS);
    let until = now + Duration::days(horizon_days.max(1));

    let links: Vec<_> = busy_cache
        .list_calendar_links(practitioner_id)
        .await
        .map_err(BookwellError::from)?
        .into_iter()
        .filter(|link| link.provider == provider.provider_name())
        .collect();

    let mut outcomes = Vec::with_capacity(links.len());
    let mut intervals = Vec::new();
    let mut fetch_failed = false;

    for link in &links {
        match provider.fetch_busy(&link.calendar_ref, now, until).await {
            Ok(batch) => {
                outcomes.push(CalendarSyncOutcome {
                    calendar_ref: link.calendar_ref.clone(),
                    intervals: batch.len(),
                    error: None,
                });
                intervals.extend(batch);
            }
            Err(e) => {
                // UpstreamSyncError policy: log, skip this provider's
                // replacement, keep serving the stale cache
                let err = BookwellError::UpstreamSyncError {
                    provider: provider.provider_name().to_string(),
                    message: e.to_string(),
                };
                warn!("Busy sync failed for {}: {}", link.calendar_ref, err);
                fetch_failed = true;
                outcomes.push(CalendarSyncOutcome {
                    calendar_ref: link.calendar_ref.clone(),
                    intervals: 0,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let cache_replaced = !links.is_empty() && !fetch_failed;
    if cache_replaced {
        busy_cache
            .replace_intervals(practitioner_id, provider.provider_name(), &intervals)
            .await
            .map_err(BookwellError::from)?;
        info!(
            "Busy cache replaced for practitioner {}: {} intervals from {} calendars",
            practitioner_id,
            intervals.len(),
            links.len()
        );
    }

    Ok(SyncReport {
        practitioner_id,
        provider: provider.provider_name().to_string(),
        cache_replaced,
        outcomes,
    })
}
