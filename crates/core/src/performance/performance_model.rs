use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// One day of a cash-flow-neutral return series.
///
/// `deposits`, `withdrawals` and `net_cash_flow` are same-day display
/// totals; the return recurrence discounts by the interval flow between
/// consecutive snapshot days, which is not carried on the point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TwrPoint {
    pub day: NaiveDate,
    pub equity: Decimal,
    pub pnl: Decimal,
    pub pnl_pct: Decimal,
    pub deposits: Decimal,
    pub withdrawals: Decimal,
    pub net_cash_flow: Decimal,
    pub daily_return: Decimal,
    /// Cumulative time-weighted return as a fraction; 0 = flat.
    pub cumulative_twr: Decimal,
    /// Marks the synthesized today entry. Snapshot-backed points are never
    /// synthetic and never overwritten.
    #[serde(default)]
    pub synthetic: bool,
}

impl TwrPoint {
    /// Cumulative TWR as a percentage, the consumer-facing view.
    pub fn cumulative_twr_pct(&self) -> Decimal {
        self.cumulative_twr * dec!(100)
    }

    /// Compounding factor relative to the series baseline.
    pub(crate) fn growth_factor(&self) -> Decimal {
        Decimal::ONE + self.cumulative_twr
    }
}

/// A dated daily return, the unit cross-series statistics operate on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnData {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// A dated cumulative-return percentage, for series that carry no per-day
/// returns (benchmark comparisons).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CumulativeReturn {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Summary statistics derived from a computed return series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReturnSummary {
    pub cumulative_twr: Decimal,
    pub annualized_twr: Decimal,
    pub volatility: Decimal,
    pub max_drawdown: Decimal,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

impl ReturnSummary {
    pub fn empty() -> Self {
        Self {
            cumulative_twr: Decimal::ZERO,
            annualized_twr: Decimal::ZERO,
            volatility: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            period_start: None,
            period_end: None,
        }
    }
}

/// An account whose data could not be fetched during an aggregate request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailedAccount {
    pub account_id: String,
    pub reason: String,
}

/// Aggregate result: the combined series over every account that fetched,
/// plus the accounts that did not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReturns {
    pub points: Vec<TwrPoint>,
    pub failed_accounts: Vec<FailedAccount>,
}

/// How the aggregator treats a day on which an account has no snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ForwardFillPolicy {
    /// The account contributes nothing that day.
    #[default]
    None,
    /// The account contributes its last known equity. Carried balances
    /// contribute no pnl.
    LastKnown,
}

/// Fan-out configuration for the multi-account aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateConfig {
    /// Per-account budget for the joined snapshot + ledger fetch. A slow
    /// account counts as failed; it never holds up the others.
    pub fetch_timeout: Duration,
    pub forward_fill: ForwardFillPolicy,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            forward_fill: ForwardFillPolicy::default(),
        }
    }
}

/// Policy knobs for the today-point overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TodayOverlayConfig {
    /// Absolute equity change below which an existing synthetic aggregate
    /// point is kept as-is.
    pub equity_threshold: Decimal,
    /// Cumulative-TWR change (fraction) below which an existing synthetic
    /// aggregate point is kept as-is.
    pub twr_threshold: Decimal,
    /// Budget for the live-balance and today-flow reads. Past it the
    /// historical series is returned without a today point.
    pub fetch_timeout: Duration,
}

impl Default for TodayOverlayConfig {
    fn default() -> Self {
        Self {
            equity_threshold: dec!(1.00),
            twr_threshold: dec!(0.0001),
            fetch_timeout: Duration::from_secs(5),
        }
    }
}
