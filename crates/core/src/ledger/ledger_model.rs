use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a cash movement. Ledger amounts are non-negative in the
/// source feed; sign always derives from the kind, never from the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowKind {
    Deposit,
    Withdrawal,
}

/// One deposit or withdrawal from the account's cash-movement ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowEvent {
    pub day: NaiveDate,
    pub kind: CashFlowKind,
    pub amount: Decimal,
}

impl CashFlowEvent {
    /// Deposits contribute +amount, withdrawals -amount.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            CashFlowKind::Deposit => self.amount,
            CashFlowKind::Withdrawal => -self.amount,
        }
    }
}

/// One raw ledger page after normalization. The feed answers either with a
/// bare array of records or with an envelope carrying `activities` and a
/// `next_page_token`; both deserialize into this enum.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum LedgerPage {
    Envelope {
        activities: Vec<CashFlowEvent>,
        #[serde(default)]
        next_page_token: Option<String>,
    },
    Bare(Vec<CashFlowEvent>),
}

impl LedgerPage {
    pub(crate) fn into_parts(self) -> (Vec<CashFlowEvent>, Option<String>) {
        match self {
            LedgerPage::Envelope {
                activities,
                next_page_token,
            } => (activities, next_page_token),
            LedgerPage::Bare(activities) => (activities, None),
        }
    }
}

/// Deposit and withdrawal totals for one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayFlow {
    pub deposits: Decimal,
    pub withdrawals: Decimal,
}

impl DayFlow {
    pub fn net(&self) -> Decimal {
        self.deposits - self.withdrawals
    }
}

/// Netted, day-keyed view of cash movements for one account - or, merged,
/// for many.
///
/// Two distinct queries live here and they are not interchangeable:
/// `day_flow`/`net` answer "what moved on this day" (display fields), while
/// `interval_flow` answers "what moved since the previous snapshot day"
/// (the amount that discounts a return).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowLedger {
    by_day: BTreeMap<NaiveDate, DayFlow>,
}

impl FlowLedger {
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a CashFlowEvent>,
    {
        let mut ledger = Self::default();
        for event in events {
            ledger.add_event(event);
        }
        ledger
    }

    pub fn add_event(&mut self, event: &CashFlowEvent) {
        let flow = self.by_day.entry(event.day).or_default();
        match event.kind {
            CashFlowKind::Deposit => flow.deposits += event.amount,
            CashFlowKind::Withdrawal => flow.withdrawals += event.amount,
        }
    }

    /// Folds another ledger into this one, day by day.
    pub fn merge(&mut self, other: &FlowLedger) {
        for (day, flow) in &other.by_day {
            let entry = self.by_day.entry(*day).or_default();
            entry.deposits += flow.deposits;
            entry.withdrawals += flow.withdrawals;
        }
    }

    /// Same-day totals; zero when the day saw no movement.
    pub fn day_flow(&self, day: NaiveDate) -> DayFlow {
        self.by_day.get(&day).copied().unwrap_or_default()
    }

    /// Signed net movement on `day`.
    pub fn net(&self, day: NaiveDate) -> Decimal {
        self.day_flow(day).net()
    }

    /// Net flow attributed to the span strictly after `prev` up to and
    /// including `day`. Zero when there is no previous snapshot day.
    pub fn interval_flow(&self, prev: Option<NaiveDate>, day: NaiveDate) -> Decimal {
        match prev {
            None => Decimal::ZERO,
            Some(prev_day) => self
                .by_day
                .range((Excluded(prev_day), Included(day)))
                .map(|(_, flow)| flow.net())
                .sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }
}
