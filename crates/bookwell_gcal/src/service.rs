// --- File: crates/bookwell_gcal/src/service.rs ---
//! Google Calendar busy-time provider.
//!
//! Implements the `BusyTimeProvider` seam over the free/busy API. The
//! provider is read-only: Bookwell never writes into the external calendar,
//! it only imports busy windows into the local cache on each sync cycle.

use bookwell_common::services::{BoxFuture, BusyTimeProvider};
use chrono::{DateTime, Utc};
use google_calendar3::api::{FreeBusyRequest, FreeBusyRequestItem};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::auth::HubType;

/// Errors that can occur when talking to Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Failed to parse time: {0}")]
    TimeParseError(String),
}

/// Google Calendar implementation of the busy-time provider.
pub struct GoogleBusyTimeProvider {
    calendar_hub: Arc<HubType>,
}

impl GoogleBusyTimeProvider {
    pub fn new(calendar_hub: Arc<HubType>) -> Self {
        Self { calendar_hub }
    }
}

impl BusyTimeProvider for GoogleBusyTimeProvider {
    type Error = GcalServiceError;

    fn provider_name(&self) -> &'static str {
        "google"
    }

    /// Busy intervals for one external calendar within a time range, sorted
    /// chronologically. Periods with a missing bound are skipped with a log
    /// line rather than failing the whole fetch.
    fn fetch_busy(
        &self,
        calendar_ref: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, Self::Error> {
        let calendar_ref = calendar_ref.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let req = FreeBusyRequest {
                time_min: Some(start_time),
                time_max: Some(end_time),
                time_zone: Some("UTC".to_string()),
                items: Some(vec![FreeBusyRequestItem {
                    id: Some(calendar_ref.clone()),
                    ..Default::default()
                }]),
                ..Default::default()
            };

            let (_response, freebusy_response) = calendar_hub.freebusy().query(req).doit().await?;

            let mut busy_periods = Vec::new();
            if let Some(calendars) = freebusy_response.calendars {
                if let Some(cal_info) = calendars.get(&calendar_ref) {
                    if let Some(busy_times) = &cal_info.busy {
                        for period in busy_times {
                            if let (Some(start_dt), Some(end_dt)) = (period.start, period.end) {
                                busy_periods.push((start_dt, end_dt));
                            } else {
                                info!(
                                    "Skipping busy period with missing start/end: {:?}",
                                    period
                                );
                            }
                        }
                    }
                }
            }

            busy_periods.sort_by_key(|k| k.0);
            Ok(busy_periods)
        })
    }
}
