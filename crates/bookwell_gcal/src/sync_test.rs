#[cfg(test)]
mod tests {
    use crate::sync::sync_busy_for_practitioner;
    use bookwell_common::models::CalendarLink;
    use bookwell_common::services::{BoxFuture, BusyTimeProvider};
    use bookwell_common::time::FixedClock;
    use bookwell_db::{BusyCacheRepository, DbClient, Repositories};
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    /// Provider double: canned intervals, or a transport failure.
    struct FakeProvider {
        intervals: Vec<(DateTime<Utc>, DateTime<Utc>)>,
        fail: bool,
    }

    impl BusyTimeProvider for FakeProvider {
        type Error = std::io::Error;

        fn provider_name(&self) -> &'static str {
            "google"
        }

        fn fetch_busy(
            &self,
            _calendar_ref: &str,
            _start_time: DateTime<Utc>,
            _end_time: DateTime<Utc>,
        ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, Self::Error> {
            let intervals = self.intervals.clone();
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    Err(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        "upstream calendar unreachable",
                    ))
                } else {
                    Ok(intervals)
                }
            })
        }
    }

    async fn setup() -> (Repositories, Uuid) {
        let path = std::env::temp_dir().join(format!("bookwell-gcal-{}.db", Uuid::new_v4()));
        let client = DbClient::from_url(&format!("sqlite://{}", path.display()))
            .await
            .expect("sqlite test database should open");
        let repos = Repositories::init(client).await.expect("schema init");

        let practitioner = Uuid::new_v4();
        repos
            .busy_cache
            .upsert_calendar_link(
                practitioner,
                CalendarLink {
                    provider: "google".to_string(),
                    calendar_ref: "practice@example.com".to_string(),
                },
            )
            .await
            .unwrap();
        (repos, practitioner)
    }

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_successful_sync_replaces_cache() {
        let (repos, practitioner) = setup().await;

        let first_batch = FakeProvider {
            intervals: vec![(
                Utc.with_ymd_and_hms(2025, 5, 5, 8, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0).unwrap(),
            )],
            fail: false,
        };
        let report = sync_busy_for_practitioner(
            &first_batch,
            &repos.busy_cache,
            &repos.availability,
            &clock(),
            practitioner,
        )
        .await
        .unwrap();
        assert!(report.cache_replaced);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].intervals, 1);

        // next cycle returns different intervals; the old batch must be gone
        let second_batch = FakeProvider {
            intervals: vec![(
                Utc.with_ymd_and_hms(2025, 5, 6, 14, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 5, 6, 15, 0, 0).unwrap(),
            )],
            fail: false,
        };
        sync_busy_for_practitioner(
            &second_batch,
            &repos.busy_cache,
            &repos.availability,
            &clock(),
            practitioner,
        )
        .await
        .unwrap();

        let cached = repos
            .busy_cache
            .list_busy(
                practitioner,
                Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 5, 31, 0, 0, 0).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(
            cached[0].start,
            Utc.with_ymd_and_hms(2025, 5, 6, 14, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_retains_stale_cache() {
        let (repos, practitioner) = setup().await;

        let good = FakeProvider {
            intervals: vec![(
                Utc.with_ymd_and_hms(2025, 5, 5, 8, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0).unwrap(),
            )],
            fail: false,
        };
        sync_busy_for_practitioner(
            &good,
            &repos.busy_cache,
            &repos.availability,
            &clock(),
            practitioner,
        )
        .await
        .unwrap();

        let broken = FakeProvider {
            intervals: vec![],
            fail: true,
        };
        let report = sync_busy_for_practitioner(
            &broken,
            &repos.busy_cache,
            &repos.availability,
            &clock(),
            practitioner,
        )
        .await
        .expect("a fetch failure is not fatal to the sync call");
        assert!(!report.cache_replaced);
        assert!(report.outcomes[0].error.is_some());

        // the previous batch is still served
        let cached = repos
            .busy_cache
            .list_busy(
                practitioner,
                Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 5, 31, 0, 0, 0).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(cached.len(), 1, "stale cache must be retained on failure");
    }

    #[tokio::test]
    async fn test_sync_without_links_is_a_no_op() {
        let (repos, _) = setup().await;
        let unlinked = Uuid::new_v4();

        let provider = FakeProvider {
            intervals: vec![],
            fail: false,
        };
        let report = sync_busy_for_practitioner(
            &provider,
            &repos.busy_cache,
            &repos.availability,
            &clock(),
            unlinked,
        )
        .await
        .unwrap();
        assert!(!report.cache_replaced);
        assert!(report.outcomes.is_empty());
    }
}
