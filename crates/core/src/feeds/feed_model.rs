use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// One trading day's recorded equity state for an account, as delivered by
/// the external snapshot history feed. Immutable once fetched; only the
/// synthesized today entry of a series is ever rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EquitySnapshot {
    /// Calendar date in the exchange timezone.
    pub day: NaiveDate,
    pub equity: Decimal,
    pub pnl: Decimal,
    pub pnl_pct: Decimal,
}

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ValidationError::InvalidInput(format!(
                "start date {} must not be after end date {}",
                start, end
            ))
            .into());
        }
        Ok(Self { start, end })
    }

    /// Single-day range, used for today's flows.
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }
}

/// Snapshot resolution of the history feed. The engine is daily-resolution
/// throughout; the parameter exists so the seam matches the feed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Granularity {
    #[default]
    Day,
}
