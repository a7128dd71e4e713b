//! Multi-account aggregate return calculation.
//!
//! Fetches every account concurrently (snapshots and ledger are two
//! independent operations per account), joins the whole fan-out, then sums
//! equities and merges ledgers single-threaded and runs the summed series
//! through the same recurrence a single account uses. One attribution
//! rule, one recurrence.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use log::{error, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::time::timeout;

use crate::errors::{Error, Result};
use crate::feeds::{CashFlowSource, DateRange, EquitySnapshot, EquitySnapshotSource, Granularity};
use crate::ledger::{CashFlowEvent, FlowLedger, LedgerAggregator};

use super::performance_model::{
    AggregateConfig, AggregateReturns, FailedAccount, ForwardFillPolicy, TwrPoint,
};
use super::twr_calculator::calculate_twr;

type AccountFetch = (Vec<EquitySnapshot>, Vec<CashFlowEvent>);

#[async_trait]
pub trait AggregateReturnsServiceTrait: Send + Sync {
    /// Computes the aggregate TWR series over `account_ids`.
    ///
    /// Partial success is success: accounts that fail to fetch (or time
    /// out) are listed on the result and the series covers the rest. Only
    /// when every account fails does the call fail.
    async fn aggregate_returns(
        &self,
        account_ids: &[String],
        range: DateRange,
    ) -> Result<AggregateReturns>;
}

pub struct AggregateReturnsService {
    snapshot_source: Arc<dyn EquitySnapshotSource>,
    ledger: LedgerAggregator,
    config: AggregateConfig,
}

impl AggregateReturnsService {
    pub fn new(
        snapshot_source: Arc<dyn EquitySnapshotSource>,
        cash_flow_source: Arc<dyn CashFlowSource>,
        config: AggregateConfig,
    ) -> Self {
        Self {
            snapshot_source,
            ledger: LedgerAggregator::new(cash_flow_source),
            config,
        }
    }

    /// Snapshots and ledger for one account, fetched concurrently.
    async fn fetch_account(&self, account_id: &str, range: DateRange) -> Result<AccountFetch> {
        let (snapshots, flows) = tokio::join!(
            self.snapshot_source
                .snapshots(account_id, range, Granularity::Day),
            self.ledger.fetch_cash_flows(account_id, range),
        );
        Ok((snapshots.map_err(Error::from)?, flows?))
    }

    /// Sums per-account snapshots into one equity series over the union of
    /// snapshot days, merges all ledgers, and runs the shared recurrence.
    fn combine(
        accounts: &[(String, AccountFetch)],
        forward_fill: ForwardFillPolicy,
    ) -> Result<Vec<TwrPoint>> {
        let mut days: BTreeSet<NaiveDate> = BTreeSet::new();
        for (_, (snapshots, _)) in accounts {
            days.extend(snapshots.iter().map(|s| s.day));
        }

        let by_account: Vec<HashMap<NaiveDate, &EquitySnapshot>> = accounts
            .iter()
            .map(|(_, (snapshots, _))| snapshots.iter().map(|s| (s.day, s)).collect())
            .collect();

        let mut last_known: Vec<Option<Decimal>> = vec![None; accounts.len()];
        let mut combined = Vec::with_capacity(days.len());
        for day in days {
            let mut equity = Decimal::ZERO;
            let mut pnl = Decimal::ZERO;
            for (index, snapshots) in by_account.iter().enumerate() {
                match snapshots.get(&day) {
                    Some(snapshot) => {
                        equity += snapshot.equity;
                        pnl += snapshot.pnl;
                        last_known[index] = Some(snapshot.equity);
                    }
                    None => {
                        if let (ForwardFillPolicy::LastKnown, Some(carried)) =
                            (forward_fill, last_known[index])
                        {
                            equity += carried;
                        }
                    }
                }
            }

            let base = equity - pnl;
            let pnl_pct = if base.is_zero() {
                Decimal::ZERO
            } else {
                pnl / base * dec!(100)
            };

            combined.push(EquitySnapshot {
                day,
                equity,
                pnl,
                pnl_pct,
            });
        }

        let mut merged = FlowLedger::default();
        for (_, (_, flows)) in accounts {
            for event in flows {
                merged.add_event(event);
            }
        }

        calculate_twr(&combined, &merged)
    }
}

#[async_trait]
impl AggregateReturnsServiceTrait for AggregateReturnsService {
    async fn aggregate_returns(
        &self,
        account_ids: &[String],
        range: DateRange,
    ) -> Result<AggregateReturns> {
        if account_ids.is_empty() {
            return Ok(AggregateReturns {
                points: Vec::new(),
                failed_accounts: Vec::new(),
            });
        }

        let fetches = account_ids.iter().map(|account_id| {
            let account_id = account_id.clone();
            async move {
                let outcome = timeout(
                    self.config.fetch_timeout,
                    self.fetch_account(&account_id, range),
                )
                .await;
                let result = match outcome {
                    Ok(Ok(data)) => Ok(data),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err(format!(
                        "fetch timed out after {:?}",
                        self.config.fetch_timeout
                    )),
                };
                (account_id, result)
            }
        });
        let results = join_all(fetches).await;

        let mut fetched: Vec<(String, AccountFetch)> = Vec::with_capacity(results.len());
        let mut failed: Vec<FailedAccount> = Vec::new();
        for (account_id, result) in results {
            match result {
                Ok(data) => fetched.push((account_id, data)),
                Err(reason) => {
                    warn!("aggregate fetch for account {} failed: {}", account_id, reason);
                    failed.push(FailedAccount { account_id, reason });
                }
            }
        }

        if fetched.is_empty() {
            error!(
                "aggregate fetch failed for all {} accounts",
                account_ids.len()
            );
            return Err(Error::AllAccountsFailed { failed });
        }

        let points = Self::combine(&fetched, self.config.forward_fill)?;
        Ok(AggregateReturns {
            points,
            failed_accounts: failed,
        })
    }
}
