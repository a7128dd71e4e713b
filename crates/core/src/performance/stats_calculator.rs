//! Statistics over daily-return series.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::constants::{MIN_CORRELATION_DAYS, TRADING_DAYS_PER_YEAR};

use super::performance_model::{ReturnData, TwrPoint};

const DAYS_PER_YEAR: Decimal = dec!(365.25);
const SQRT_TRADING_DAYS_APPROX: Decimal = dec!(15.874507866); // sqrt(252)

/// Extracts the dated daily returns of a series, the shape `correlation`
/// consumes.
pub fn daily_returns(points: &[TwrPoint]) -> Vec<ReturnData> {
    points
        .iter()
        .map(|p| ReturnData {
            date: p.day,
            value: p.daily_return,
        })
        .collect()
}

/// Pearson correlation of day-over-day returns, computed only on the
/// calendar days common to both series. Fewer than `MIN_CORRELATION_DAYS`
/// common days, or a zero-variance side, yields the neutral 0.0.
pub fn correlation(a: &[ReturnData], b: &[ReturnData]) -> Decimal {
    let b_by_date: HashMap<NaiveDate, Decimal> =
        b.iter().map(|r| (r.date, r.value)).collect();

    let pairs: Vec<(Decimal, Decimal)> = a
        .iter()
        .filter_map(|r| b_by_date.get(&r.date).map(|v| (r.value, *v)))
        .collect();

    if pairs.len() < MIN_CORRELATION_DAYS {
        return Decimal::ZERO;
    }

    let count = Decimal::from(pairs.len());
    let mean_a: Decimal = pairs.iter().map(|(x, _)| *x).sum::<Decimal>() / count;
    let mean_b: Decimal = pairs.iter().map(|(_, y)| *y).sum::<Decimal>() / count;

    let mut covariance = Decimal::ZERO;
    let mut variance_a = Decimal::ZERO;
    let mut variance_b = Decimal::ZERO;
    for (x, y) in &pairs {
        let dx = *x - mean_a;
        let dy = *y - mean_b;
        covariance += dx * dy;
        variance_a += dx * dx;
        variance_b += dy * dy;
    }

    if variance_a.is_zero() || variance_b.is_zero() {
        return Decimal::ZERO;
    }

    let denominator = (variance_a * variance_b).sqrt().unwrap_or(Decimal::ZERO);
    if denominator.is_zero() {
        return Decimal::ZERO;
    }

    covariance / denominator
}

/// Annualized volatility: population standard deviation of daily returns,
/// scaled by sqrt(252).
pub fn volatility(daily_returns: &[Decimal]) -> Decimal {
    if daily_returns.len() < 2 {
        return Decimal::ZERO;
    }

    let count = Decimal::from(daily_returns.len());
    let sum: Decimal = daily_returns.iter().sum();
    let mean = sum / count;

    let sum_squared_diff: Decimal = daily_returns
        .iter()
        .map(|&r| {
            let diff = r - mean;
            diff * diff
        })
        .sum();

    let variance = sum_squared_diff / count;
    let daily_volatility = variance.sqrt().unwrap_or(Decimal::ZERO);

    let annualization_factor = Decimal::from(TRADING_DAYS_PER_YEAR)
        .sqrt()
        .unwrap_or(SQRT_TRADING_DAYS_APPROX);

    daily_volatility * annualization_factor
}

/// Annualizes a total return over the period `[start_date, end_date]`.
/// Periods under a year report the total return unchanged; a total loss
/// caps at -100%.
pub fn annualized_return(
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_return: Decimal,
) -> Decimal {
    if start_date > end_date {
        return Decimal::ZERO;
    }

    if total_return <= dec!(-1.0) {
        return dec!(-1.0);
    }

    let days = (end_date - start_date).num_days();
    if days <= 0 {
        return total_return;
    }

    let years = Decimal::from(days) / DAYS_PER_YEAR;
    if years < Decimal::ONE {
        return total_return;
    }

    let base = Decimal::ONE + total_return;
    if base <= Decimal::ZERO {
        return dec!(-1.0);
    }

    let exponent = Decimal::ONE / years;
    base.powd(exponent) - Decimal::ONE
}

/// Largest peak-to-trough loss of the compounded series, as a fraction.
pub fn max_drawdown(daily_returns: &[Decimal]) -> Decimal {
    if daily_returns.is_empty() {
        return Decimal::ZERO;
    }

    let mut cumulative_value = Decimal::ONE;
    let mut peak_value = Decimal::ONE;
    let mut max_drawdown = Decimal::ZERO;

    for &daily_return in daily_returns {
        cumulative_value *= Decimal::ONE + daily_return;
        peak_value = peak_value.max(cumulative_value);
        if peak_value.is_zero() {
            max_drawdown = max_drawdown.max(Decimal::ONE);
        } else {
            let drawdown = (peak_value - cumulative_value) / peak_value;
            max_drawdown = max_drawdown.max(drawdown);
        }
    }

    max_drawdown.max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn series(values: &[(u32, Decimal)]) -> Vec<ReturnData> {
        values
            .iter()
            .map(|(d, v)| ReturnData {
                date: day(*d),
                value: *v,
            })
            .collect()
    }

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "{} not within {} of {}",
            actual,
            tolerance,
            expected
        );
    }

    #[test]
    fn test_identical_series_correlate_to_one() {
        let a = series(&[(1, dec!(0.01)), (2, dec!(-0.02)), (3, dec!(0.005))]);
        let b = a.clone();
        assert_close(correlation(&a, &b), Decimal::ONE, dec!(0.000000001));
    }

    #[test]
    fn test_negated_series_correlate_to_minus_one() {
        let a = series(&[(1, dec!(0.01)), (2, dec!(-0.02)), (3, dec!(0.005))]);
        let b: Vec<ReturnData> = a
            .iter()
            .map(|r| ReturnData {
                date: r.date,
                value: -r.value,
            })
            .collect();
        assert_close(correlation(&a, &b), dec!(-1), dec!(0.000000001));
    }

    #[test]
    fn test_fewer_than_three_common_days_is_neutral() {
        let a = series(&[(1, dec!(0.01)), (2, dec!(0.02)), (3, dec!(0.03))]);
        let b = series(&[(2, dec!(0.02)), (3, dec!(0.01)), (9, dec!(0.04))]);
        assert_eq!(correlation(&a, &b), Decimal::ZERO);
    }

    #[test]
    fn test_correlation_uses_intersection_not_union() {
        // days 1-3 align perfectly; day 9 exists only on one side and must
        // not drag the coefficient down
        let a = series(&[
            (1, dec!(0.01)),
            (2, dec!(-0.02)),
            (3, dec!(0.005)),
            (9, dec!(0.5)),
        ]);
        let b = series(&[(1, dec!(0.01)), (2, dec!(-0.02)), (3, dec!(0.005))]);
        assert_close(correlation(&a, &b), Decimal::ONE, dec!(0.000000001));
    }

    #[test]
    fn test_zero_variance_side_is_neutral() {
        let flat = series(&[(1, dec!(0.01)), (2, dec!(0.01)), (3, dec!(0.01))]);
        let moving = series(&[(1, dec!(0.01)), (2, dec!(-0.02)), (3, dec!(0.03))]);
        assert_eq!(correlation(&flat, &moving), Decimal::ZERO);
    }

    #[test]
    fn test_volatility_is_population_stddev_annualized() {
        // returns 0.01 and -0.01: mean 0, population variance 0.0001
        let vol = volatility(&[dec!(0.01), dec!(-0.01)]);
        assert_close(vol, dec!(0.01) * SQRT_TRADING_DAYS_APPROX, dec!(0.0001));
    }

    #[test]
    fn test_volatility_of_single_return_is_zero() {
        assert_eq!(volatility(&[dec!(0.05)]), Decimal::ZERO);
    }

    #[test]
    fn test_annualized_return_under_one_year_is_total_return() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(annualized_return(start, end, dec!(0.08)), dec!(0.08));
    }

    #[test]
    fn test_annualized_return_compounds_down_over_two_years() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        // 21% over ~2 years is ~10% per year
        let annualized = annualized_return(start, end, dec!(0.21));
        assert_close(annualized, dec!(0.1), dec!(0.001));
    }

    #[test]
    fn test_annualized_return_caps_total_loss() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(annualized_return(start, end, dec!(-1.0)), dec!(-1.0));
    }

    #[test]
    fn test_max_drawdown_picks_deepest_trough() {
        // up 10%, down 20%, up 5%: trough is 0.88 of the 1.10 peak
        let dd = max_drawdown(&[dec!(0.10), dec!(-0.20), dec!(0.05)]);
        assert_close(dd, dec!(0.20), dec!(0.000001));
    }

    #[test]
    fn test_max_drawdown_of_monotonic_gains_is_zero() {
        assert_eq!(
            max_drawdown(&[dec!(0.01), dec!(0.02), dec!(0.03)]),
            Decimal::ZERO
        );
    }
}
