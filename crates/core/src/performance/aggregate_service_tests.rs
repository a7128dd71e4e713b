#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::errors::{Error, FeedError};
    use crate::feeds::{
        CashFlowSource, DateRange, EquitySnapshot, EquitySnapshotSource, Granularity,
    };
    use crate::performance::aggregate_service::{
        AggregateReturnsService, AggregateReturnsServiceTrait,
    };
    use crate::performance::performance_model::{AggregateConfig, ForwardFillPolicy};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn range() -> DateRange {
        DateRange::new(day(1), day(30)).unwrap()
    }

    fn snapshot(d: u32, equity: Decimal) -> EquitySnapshot {
        EquitySnapshot {
            day: day(d),
            equity,
            pnl: Decimal::ZERO,
            pnl_pct: Decimal::ZERO,
        }
    }

    /// Snapshot feed with canned series per account; unknown accounts fail.
    struct FixtureSnapshots {
        by_account: HashMap<String, Vec<EquitySnapshot>>,
        delay: Option<Duration>,
    }

    impl FixtureSnapshots {
        fn new(by_account: HashMap<String, Vec<EquitySnapshot>>) -> Self {
            Self {
                by_account,
                delay: None,
            }
        }
    }

    #[async_trait]
    impl EquitySnapshotSource for FixtureSnapshots {
        async fn snapshots(
            &self,
            account_id: &str,
            _range: DateRange,
            _granularity: Granularity,
        ) -> Result<Vec<EquitySnapshot>, FeedError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.by_account
                .get(account_id)
                .cloned()
                .ok_or_else(|| FeedError::NotFound(format!("account {}", account_id)))
        }
    }

    /// Ledger feed answering one bare-array page per account.
    struct FixtureFlows {
        by_account: HashMap<String, serde_json::Value>,
    }

    impl FixtureFlows {
        fn empty() -> Self {
            Self {
                by_account: HashMap::new(),
            }
        }
    }

    #[async_trait]
    impl CashFlowSource for FixtureFlows {
        async fn fetch_page(
            &self,
            account_id: &str,
            _range: DateRange,
            _page_token: Option<&str>,
            _page_size: usize,
        ) -> Result<serde_json::Value, FeedError> {
            Ok(self
                .by_account
                .get(account_id)
                .cloned()
                .unwrap_or_else(|| json!([])))
        }
    }

    fn service(
        snapshots: FixtureSnapshots,
        flows: FixtureFlows,
        config: AggregateConfig,
    ) -> AggregateReturnsService {
        AggregateReturnsService::new(Arc::new(snapshots), Arc::new(flows), config)
    }

    fn two_account_fixture() -> FixtureSnapshots {
        let mut by_account = HashMap::new();
        by_account.insert(
            "alpha".to_string(),
            vec![snapshot(2, dec!(100)), snapshot(3, dec!(110))],
        );
        by_account.insert("beta".to_string(), vec![snapshot(2, dec!(50))]);
        FixtureSnapshots::new(by_account)
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_not_forward_filled_by_default() {
        let service = service(
            two_account_fixture(),
            FixtureFlows::empty(),
            AggregateConfig::default(),
        );

        let result = service
            .aggregate_returns(&["alpha".into(), "beta".into()], range())
            .await
            .unwrap();

        let equities: Vec<Decimal> = result.points.iter().map(|p| p.equity).collect();
        assert_eq!(equities, vec![dec!(150), dec!(110)]);
        assert!(result.failed_accounts.is_empty());
    }

    #[tokio::test]
    async fn test_last_known_policy_carries_the_missing_account() {
        let config = AggregateConfig {
            forward_fill: ForwardFillPolicy::LastKnown,
            ..AggregateConfig::default()
        };
        let service = service(two_account_fixture(), FixtureFlows::empty(), config);

        let result = service
            .aggregate_returns(&["alpha".into(), "beta".into()], range())
            .await
            .unwrap();

        let equities: Vec<Decimal> = result.points.iter().map(|p| p.equity).collect();
        assert_eq!(equities, vec![dec!(150), dec!(160)]);
    }

    #[tokio::test]
    async fn test_partial_failure_still_computes_the_rest() {
        let service = service(
            two_account_fixture(),
            FixtureFlows::empty(),
            AggregateConfig::default(),
        );

        let result = service
            .aggregate_returns(&["alpha".into(), "ghost".into()], range())
            .await
            .unwrap();

        assert_eq!(result.failed_accounts.len(), 1);
        assert_eq!(result.failed_accounts[0].account_id, "ghost");
        let equities: Vec<Decimal> = result.points.iter().map(|p| p.equity).collect();
        assert_eq!(equities, vec![dec!(100), dec!(110)]);
    }

    #[tokio::test]
    async fn test_all_accounts_failing_fails_the_call() {
        let service = service(
            FixtureSnapshots::new(HashMap::new()),
            FixtureFlows::empty(),
            AggregateConfig::default(),
        );

        let err = service
            .aggregate_returns(&["ghost-1".into(), "ghost-2".into()], range())
            .await
            .unwrap_err();

        match err {
            Error::AllAccountsFailed { failed } => assert_eq!(failed.len(), 2),
            other => panic!("expected AllAccountsFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_account_times_out_and_counts_as_failed() {
        let config = AggregateConfig {
            fetch_timeout: Duration::from_millis(20),
            ..AggregateConfig::default()
        };
        let delayed = FixtureSnapshots {
            by_account: HashMap::from([("slow".to_string(), vec![snapshot(2, dec!(100))])]),
            delay: Some(Duration::from_millis(200)),
        };
        let service = service(delayed, FixtureFlows::empty(), config);

        let err = service
            .aggregate_returns(&["slow".into()], range())
            .await
            .unwrap_err();

        match err {
            Error::AllAccountsFailed { failed } => {
                assert_eq!(failed.len(), 1);
                assert!(failed[0].reason.contains("timed out"));
            }
            other => panic!("expected AllAccountsFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_flows_merge_across_accounts_for_attribution() {
        let mut by_account = HashMap::new();
        by_account.insert(
            "alpha".to_string(),
            vec![snapshot(2, dec!(1000)), snapshot(3, dec!(1100))],
        );
        by_account.insert(
            "beta".to_string(),
            vec![snapshot(2, dec!(500)), snapshot(3, dec!(900))],
        );
        let flows = FixtureFlows {
            by_account: HashMap::from([(
                "beta".to_string(),
                json!([{ "day": "2025-06-03", "kind": "deposit", "amount": 400.0 }]),
            )]),
        };

        let service = service(
            FixtureSnapshots::new(by_account),
            flows,
            AggregateConfig::default(),
        );
        let result = service
            .aggregate_returns(&["alpha".into(), "beta".into()], range())
            .await
            .unwrap();

        // (2000 - 400) / 1500 - 1
        let expected = dec!(1600) / dec!(1500) - Decimal::ONE;
        assert_eq!(result.points[1].daily_return, expected);
        assert_eq!(result.points[1].deposits, dec!(400));
    }

    #[tokio::test]
    async fn test_empty_account_list_yields_empty_result() {
        let service = service(
            FixtureSnapshots::new(HashMap::new()),
            FixtureFlows::empty(),
            AggregateConfig::default(),
        );
        let result = service.aggregate_returns(&[], range()).await.unwrap();
        assert!(result.points.is_empty());
        assert!(result.failed_accounts.is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_pnl_sums_contributing_accounts() {
        let mut by_account = HashMap::new();
        by_account.insert(
            "alpha".to_string(),
            vec![EquitySnapshot {
                day: day(2),
                equity: dec!(110),
                pnl: dec!(10),
                pnl_pct: dec!(10),
            }],
        );
        by_account.insert(
            "beta".to_string(),
            vec![EquitySnapshot {
                day: day(2),
                equity: dec!(95),
                pnl: dec!(-5),
                pnl_pct: dec!(-5),
            }],
        );
        let service = service(
            FixtureSnapshots::new(by_account),
            FixtureFlows::empty(),
            AggregateConfig::default(),
        );

        let result = service
            .aggregate_returns(&["alpha".into(), "beta".into()], range())
            .await
            .unwrap();

        assert_eq!(result.points[0].equity, dec!(205));
        assert_eq!(result.points[0].pnl, dec!(5));
        // 5 gained on a 200 base
        assert_eq!(result.points[0].pnl_pct, dec!(2.5));
    }
}
