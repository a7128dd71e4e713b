//! Collaborator seams for the external data feeds.
//!
//! The engine performs no I/O of its own: snapshot history, the cash-flow
//! ledger and live balances all arrive through these traits. Implementations
//! own transport concerns (HTTP, headers, retries, credentials).

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{DateRange, EquitySnapshot, Granularity};
use crate::errors::FeedError;

/// Source of daily equity snapshots for an account.
#[async_trait]
pub trait EquitySnapshotSource: Send + Sync {
    /// Fetches the snapshot series for `account_id` over `range`, ordered
    /// ascending by day.
    async fn snapshots(
        &self,
        account_id: &str,
        range: DateRange,
        granularity: Granularity,
    ) -> Result<Vec<EquitySnapshot>, FeedError>;
}

/// Paginated source of cash-movement records.
#[async_trait]
pub trait CashFlowSource: Send + Sync {
    /// Fetches one raw page of the ledger, ascending, at most `page_size`
    /// records. The page is returned as raw JSON because the feed answers
    /// in two shapes - a bare array of records, or an envelope object with
    /// an `activities` array and a `next_page_token` - and normalizing the
    /// two is the engine's job, not the transport's.
    async fn fetch_page(
        &self,
        account_id: &str,
        range: DateRange,
        page_token: Option<&str>,
        page_size: usize,
    ) -> Result<serde_json::Value, FeedError>;
}

/// Live (intraday, non-snapshot) account balance read.
#[async_trait]
pub trait LiveBalanceSource: Send + Sync {
    async fn current_equity(&self, account_id: &str) -> Result<Decimal, FeedError>;
}
