//! Per-account return series retrieval.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::errors::{Error, Result};
use crate::feeds::{CashFlowSource, DateRange, EquitySnapshotSource, Granularity};
use crate::ledger::LedgerAggregator;

use super::performance_model::TwrPoint;
use super::twr_calculator::calculate_twr;

#[async_trait]
pub trait AccountReturnsServiceTrait: Send + Sync {
    /// Fetches one account's snapshots and cash flows and computes its TWR
    /// series. An account with no snapshots yet yields an empty series.
    async fn account_returns(&self, account_id: &str, range: DateRange) -> Result<Vec<TwrPoint>>;
}

pub struct AccountReturnsService {
    snapshot_source: Arc<dyn EquitySnapshotSource>,
    ledger: LedgerAggregator,
}

impl AccountReturnsService {
    pub fn new(
        snapshot_source: Arc<dyn EquitySnapshotSource>,
        cash_flow_source: Arc<dyn CashFlowSource>,
    ) -> Self {
        Self {
            snapshot_source,
            ledger: LedgerAggregator::new(cash_flow_source),
        }
    }
}

#[async_trait]
impl AccountReturnsServiceTrait for AccountReturnsService {
    async fn account_returns(&self, account_id: &str, range: DateRange) -> Result<Vec<TwrPoint>> {
        let (snapshots, ledger) = tokio::join!(
            self.snapshot_source
                .snapshots(account_id, range, Granularity::Day),
            self.ledger.fetch_ledger(account_id, range),
        );
        let snapshots = snapshots.map_err(Error::from)?;
        let ledger = ledger?;

        if snapshots.is_empty() {
            debug!(
                "no snapshots for account {} between {} and {}; returning empty series",
                account_id, range.start, range.end
            );
        }

        calculate_twr(&snapshots, &ledger)
    }
}
