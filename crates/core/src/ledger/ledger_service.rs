//! Cash-flow ledger retrieval.
//!
//! Walks the paginated cash-movement feed for an account and nets the
//! result into per-day flows for the return calculators.

use std::sync::Arc;

use log::{debug, warn};

use crate::constants::{LEDGER_MAX_PAGES, LEDGER_PAGE_SIZE};
use crate::errors::{FeedError, Result};
use crate::feeds::{CashFlowSource, DateRange};

use super::ledger_model::{CashFlowEvent, FlowLedger, LedgerPage};

/// Paginates the cash-movement feed and aggregates the events it returns.
#[derive(Clone)]
pub struct LedgerAggregator {
    source: Arc<dyn CashFlowSource>,
}

impl LedgerAggregator {
    pub fn new(source: Arc<dyn CashFlowSource>) -> Self {
        Self { source }
    }

    /// Fetches the complete cash-flow ledger for `account_id` over `range`,
    /// ordered ascending by day.
    ///
    /// Pages are requested ascending with `LEDGER_PAGE_SIZE` records each.
    /// Retrieval continues while a full page arrives together with a
    /// continuation token, and stops at the first short page or
    /// empty/absent token. A feed that never signals completion is cut off
    /// at `LEDGER_MAX_PAGES` pages and whatever was collected is returned.
    pub async fn fetch_cash_flows(
        &self,
        account_id: &str,
        range: DateRange,
    ) -> Result<Vec<CashFlowEvent>> {
        let mut events: Vec<CashFlowEvent> = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let raw = self
                .source
                .fetch_page(account_id, range, page_token.as_deref(), LEDGER_PAGE_SIZE)
                .await?;
            let page: LedgerPage = serde_json::from_value(raw).map_err(|e| {
                FeedError::InvalidResponse(format!("ledger page for {}: {}", account_id, e))
            })?;
            let (items, next_token) = page.into_parts();
            pages += 1;
            let count = items.len();
            debug!(
                "ledger page {} for {}: {} records",
                pages, account_id, count
            );
            events.extend(items);

            let token = next_token.filter(|t| !t.is_empty());
            if count < LEDGER_PAGE_SIZE || token.is_none() {
                break;
            }
            if pages >= LEDGER_MAX_PAGES {
                warn!(
                    "ledger pagination for {} cut off at {} pages; returning {} records collected so far",
                    account_id,
                    LEDGER_MAX_PAGES,
                    events.len()
                );
                break;
            }
            page_token = token;
        }

        events.sort_by_key(|e| e.day);
        Ok(events)
    }

    /// Fetches the ledger and nets it into per-day flows.
    pub async fn fetch_ledger(&self, account_id: &str, range: DateRange) -> Result<FlowLedger> {
        let events = self.fetch_cash_flows(account_id, range).await?;
        Ok(FlowLedger::from_events(&events))
    }
}
