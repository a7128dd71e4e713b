//! Best-effort synthesis of a "today" series point from live balances.
//!
//! Snapshot feeds lag the market by a day; the synthesizer overlays the
//! current session on top of the historical series using a live balance
//! read and today's cash flows. The overlay is strictly best-effort: both
//! reads run under one bounded wait, and past it the historical series is
//! returned without a today point rather than blocking.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::time::timeout;

use crate::errors::{Error, Result};
use crate::feeds::{CashFlowSource, DateRange, LiveBalanceSource};
use crate::ledger::{DayFlow, FlowLedger, LedgerAggregator};

use super::performance_model::{TodayOverlayConfig, TwrPoint};

/// Which write policy applies when overlaying the today point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayScope {
    /// Per-account series: always overwrite or append.
    Account,
    /// Aggregate series: overwrite an existing synthetic point only when
    /// the change clears the jitter thresholds.
    Aggregate,
}

pub struct TodaySynthesizer {
    live_balance_source: Arc<dyn LiveBalanceSource>,
    ledger: LedgerAggregator,
    config: TodayOverlayConfig,
}

impl TodaySynthesizer {
    pub fn new(
        live_balance_source: Arc<dyn LiveBalanceSource>,
        cash_flow_source: Arc<dyn CashFlowSource>,
        config: TodayOverlayConfig,
    ) -> Self {
        Self {
            live_balance_source,
            ledger: LedgerAggregator::new(cash_flow_source),
            config,
        }
    }

    /// Overlays a synthesized today point onto `series`, summing live
    /// balances and today's flows across `account_ids` (a single id for a
    /// per-account series).
    ///
    /// No-ops when today lies outside `range`, when the series is empty,
    /// or when a real snapshot already covers today. Never fails: on a
    /// slow or broken feed the historical series comes back unchanged.
    pub async fn overlay_today(
        &self,
        series: Vec<TwrPoint>,
        account_ids: &[String],
        range: DateRange,
        today: NaiveDate,
        scope: OverlayScope,
    ) -> Vec<TwrPoint> {
        if !range.contains(today) || series.is_empty() {
            return series;
        }
        if let Some(last) = series.last() {
            if last.day == today && !last.synthetic {
                return series;
            }
            if last.day > today {
                return series;
            }
        }

        match timeout(self.config.fetch_timeout, self.fetch_today(account_ids, today)).await {
            Ok(Ok((live_equity, todays_flows))) => append_or_update_today(
                series,
                live_equity,
                todays_flows,
                today,
                scope,
                &self.config,
            ),
            Ok(Err(e)) => {
                warn!("today overlay skipped: {}", e);
                series
            }
            Err(_) => {
                warn!(
                    "today overlay timed out after {:?}; returning historical series",
                    self.config.fetch_timeout
                );
                series
            }
        }
    }

    /// Live balances and today's flows for every account, all fetched
    /// concurrently and summed.
    async fn fetch_today(
        &self,
        account_ids: &[String],
        today: NaiveDate,
    ) -> Result<(Decimal, DayFlow)> {
        let balance_futures = account_ids
            .iter()
            .map(|id| self.live_balance_source.current_equity(id));
        let flow_futures = account_ids
            .iter()
            .map(|id| self.ledger.fetch_ledger(id, DateRange::single(today)));

        let (balances, ledgers) = tokio::join!(join_all(balance_futures), join_all(flow_futures));

        let mut live_equity = Decimal::ZERO;
        for balance in balances {
            live_equity += balance.map_err(Error::from)?;
        }

        let mut merged = FlowLedger::default();
        for ledger in ledgers {
            merged.merge(&ledger?);
        }

        Ok((live_equity, merged.day_flow(today)))
    }
}

/// Appends or overwrites the final today point of `series`.
///
/// The return uses the last historical point's equity as the previous
/// equity and `live_equity - net(today)` as adjusted equity, under the
/// same guards as the daily recurrence. A real snapshot dated today is
/// left untouched; an existing synthetic point is replaced according to
/// `scope`.
pub fn append_or_update_today(
    mut series: Vec<TwrPoint>,
    live_equity: Decimal,
    todays_flows: DayFlow,
    today: NaiveDate,
    scope: OverlayScope,
    config: &TodayOverlayConfig,
) -> Vec<TwrPoint> {
    let existing = match series.last() {
        Some(last) if last.day == today => {
            if !last.synthetic {
                return series;
            }
            series.pop()
        }
        _ => None,
    };

    let prev = match series.last() {
        Some(prev) => prev.clone(),
        None => {
            // nothing to anchor the return on; restore what was there
            if let Some(point) = existing {
                series.push(point);
            }
            return series;
        }
    };

    let net_flow = todays_flows.net();
    let adjusted_equity = live_equity - net_flow;
    let daily_return = if prev.equity > Decimal::ZERO && adjusted_equity > Decimal::ZERO {
        adjusted_equity / prev.equity - Decimal::ONE
    } else {
        Decimal::ZERO
    };
    let cumulative_twr = prev.growth_factor() * (Decimal::ONE + daily_return) - Decimal::ONE;

    let pnl = live_equity - prev.equity - net_flow;
    let pnl_pct = if prev.equity.is_zero() {
        Decimal::ZERO
    } else {
        pnl / prev.equity * dec!(100)
    };

    let candidate = TwrPoint {
        day: today,
        equity: live_equity,
        pnl,
        pnl_pct,
        deposits: todays_flows.deposits,
        withdrawals: todays_flows.withdrawals,
        net_cash_flow: net_flow,
        daily_return,
        cumulative_twr,
        synthetic: true,
    };

    let keep_existing = match (&existing, scope) {
        (Some(prior), OverlayScope::Aggregate) => {
            let equity_delta = (candidate.equity - prior.equity).abs();
            let twr_delta = (candidate.cumulative_twr - prior.cumulative_twr).abs();
            equity_delta <= config.equity_threshold && twr_delta <= config.twr_threshold
        }
        _ => false,
    };

    match (keep_existing, existing) {
        (true, Some(prior)) => series.push(prior),
        _ => series.push(candidate),
    }

    series
}
