//! Per-account time-weighted return calculation.
//!
//! The recurrence compounds daily returns computed on cash-flow-adjusted
//! equity, so deposits and withdrawals move the balance without moving the
//! return. Same-day flow totals are carried on each point for display; the
//! return itself is discounted by the interval flow between consecutive
//! snapshot days.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::constants::DECIMAL_PRECISION;
use crate::errors::{CalculatorError, Result};
use crate::feeds::EquitySnapshot;
use crate::ledger::FlowLedger;

use super::performance_model::{ReturnSummary, TwrPoint};
use super::stats_calculator;

/// Converts one account's equity snapshots and netted cash flows into a
/// daily-return / cumulative-TWR series.
///
/// Snapshots are sorted ascending before the recurrence runs; days are
/// expected unique. An empty snapshot series yields an empty result:
/// callers treat "no data yet" as a displayable state, not a failure.
///
/// Guards, applied in order:
/// - a first point, or a point following zero recorded equity, earns a
///   zero return; a positive-equity point there (re)starts the
///   compounding base at 1.0 rather than dividing by zero,
/// - an interval whose flow-adjusted equity is non-positive (a withdrawal
///   exceeding equity) earns a zero return instead of an unbounded or
///   negative-base one.
pub fn calculate_twr(snapshots: &[EquitySnapshot], ledger: &FlowLedger) -> Result<Vec<TwrPoint>> {
    if snapshots.is_empty() {
        return Ok(Vec::new());
    }

    let mut ordered: Vec<&EquitySnapshot> = snapshots.iter().collect();
    ordered.sort_by_key(|s| s.day);

    let mut points = Vec::with_capacity(ordered.len());
    let mut prev_day: Option<NaiveDate> = None;
    let mut prev_equity = Decimal::ZERO;
    let mut cumulative = Decimal::ONE;
    let mut started = false;

    for snapshot in ordered {
        if snapshot.equity.is_sign_negative() {
            return Err(CalculatorError::NegativeEquity(format!(
                "{} on {}",
                snapshot.equity, snapshot.day
            ))
            .into());
        }

        let day_flow = ledger.day_flow(snapshot.day);
        let mut daily_return = Decimal::ZERO;

        if prev_day.is_none() || prev_equity.is_zero() {
            if snapshot.equity > Decimal::ZERO {
                cumulative = Decimal::ONE;
                started = true;
            }
        } else if started {
            let interval_flow = ledger.interval_flow(prev_day, snapshot.day);
            let adjusted_equity = snapshot.equity - interval_flow;
            if adjusted_equity > Decimal::ZERO {
                daily_return = adjusted_equity / prev_equity - Decimal::ONE;
                cumulative *= Decimal::ONE + daily_return;
            }
        }

        points.push(TwrPoint {
            day: snapshot.day,
            equity: snapshot.equity,
            pnl: snapshot.pnl,
            pnl_pct: snapshot.pnl_pct,
            deposits: day_flow.deposits,
            withdrawals: day_flow.withdrawals,
            net_cash_flow: day_flow.net(),
            daily_return,
            cumulative_twr: cumulative - Decimal::ONE,
            synthetic: false,
        });

        prev_equity = snapshot.equity;
        prev_day = Some(snapshot.day);
    }

    Ok(points)
}

/// Derives summary statistics from a computed series.
pub fn summarize(points: &[TwrPoint]) -> ReturnSummary {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return ReturnSummary::empty(),
    };

    // the first point's return is zero by construction; it is not a period
    let daily_returns: Vec<Decimal> = points[1..].iter().map(|p| p.daily_return).collect();
    let cumulative_twr = last.cumulative_twr;

    ReturnSummary {
        cumulative_twr: cumulative_twr.round_dp(DECIMAL_PRECISION),
        annualized_twr: stats_calculator::annualized_return(first.day, last.day, cumulative_twr)
            .round_dp(DECIMAL_PRECISION),
        volatility: stats_calculator::volatility(&daily_returns).round_dp(DECIMAL_PRECISION),
        max_drawdown: stats_calculator::max_drawdown(&daily_returns).round_dp(DECIMAL_PRECISION),
        period_start: Some(first.day),
        period_end: Some(last.day),
    }
}
