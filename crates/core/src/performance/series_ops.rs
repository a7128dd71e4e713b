//! Window clamp and re-baselining of return series.
//!
//! Both rebase strategies reduce to one compounding primitive over
//! per-interval returns. The percentage-only form reconstructs its
//! interval returns from consecutive cumulative values first, so the two
//! cannot drift apart.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::feeds::DateRange;

use super::performance_model::{CumulativeReturn, TwrPoint};

/// Restricts `series` to days within `range` and re-baselines the first
/// retained point to 0%, recomputing every later point by compounding its
/// daily return forward.
///
/// Applying the same window twice equals applying it once.
pub fn clamp_and_rebase(series: &[TwrPoint], range: DateRange) -> Vec<TwrPoint> {
    let mut retained: Vec<TwrPoint> = series
        .iter()
        .filter(|p| range.contains(p.day))
        .cloned()
        .collect();

    let mut cumulative = Decimal::ONE;
    for (i, point) in retained.iter_mut().enumerate() {
        if i > 0 {
            cumulative *= Decimal::ONE + point.daily_return;
        }
        point.cumulative_twr = cumulative - Decimal::ONE;
    }

    retained
}

/// Restricts a cumulative-percentage series to `range` and re-baselines it
/// to 0% at its first retained point.
///
/// For series without per-day returns (benchmark comparisons). Interval
/// returns are reconstructed from consecutive cumulative percentages and
/// compounded the same way `clamp_and_rebase` compounds, which is
/// algebraically `((1 + v_i/100) / (1 + v_0/100) - 1) * 100`.
pub fn clamp_and_rebase_cumulative(
    series: &[CumulativeReturn],
    range: DateRange,
) -> Vec<CumulativeReturn> {
    let hundred = dec!(100);
    let retained: Vec<&CumulativeReturn> = series
        .iter()
        .filter(|p| range.contains(p.date))
        .collect();

    let mut rebased = Vec::with_capacity(retained.len());
    let mut cumulative = Decimal::ONE;
    let mut prev_factor = Decimal::ONE;

    for (i, point) in retained.iter().enumerate() {
        let factor = Decimal::ONE + point.value / hundred;
        if i > 0 && !prev_factor.is_zero() {
            let interval_return = factor / prev_factor - Decimal::ONE;
            cumulative *= Decimal::ONE + interval_return;
        }
        rebased.push(CumulativeReturn {
            date: point.date,
            value: (cumulative - Decimal::ONE) * hundred,
        });
        prev_factor = factor;
    }

    rebased
}
