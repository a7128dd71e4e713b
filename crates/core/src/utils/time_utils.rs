use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Default timezone for trade dates.
/// Snapshot days arrive keyed to the exchange calendar; for a US brokerage
/// feed America/New_York is the operative zone.
pub const DEFAULT_EXCHANGE_TZ: Tz = chrono_tz::America::New_York;

/// Converts a UTC instant to a trade date in the given timezone.
///
/// This is the single source of truth for converting instants to calendar
/// days. Use this whenever you need to derive "today" for a series.
pub fn trade_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Convenience function that uses the default exchange timezone.
/// Equivalent to `trade_date_from_utc(Utc::now(), DEFAULT_EXCHANGE_TZ)`.
pub fn trade_date_today() -> NaiveDate {
    trade_date_from_utc(Utc::now(), DEFAULT_EXCHANGE_TZ)
}
