/// Page size requested from the cash-flow ledger feed
pub const LEDGER_PAGE_SIZE: usize = 100;

/// Hard cap on ledger pages fetched per account. A feed that never signals
/// completion stops here and whatever was collected is surfaced.
pub const LEDGER_MAX_PAGES: usize = 1000;

/// Trading days per year, used to annualize daily volatility
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Minimum overlapping days for cross-series correlation
pub const MIN_CORRELATION_DAYS: usize = 3;

/// Decimal precision for summary metrics
pub const DECIMAL_PRECISION: u32 = 6;
