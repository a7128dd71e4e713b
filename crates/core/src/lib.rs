//! Paperfolio Core - Time-weighted return engine.
//!
//! This crate turns daily equity snapshots and a deposit/withdrawal ledger
//! into cash-flow-neutral cumulative return series, for single accounts and
//! for aggregates of many accounts. It is transport- and storage-agnostic:
//! all data crosses the `feeds` trait seams, and nothing is persisted
//! between calls.

pub mod constants;
pub mod errors;
pub mod feeds;
pub mod ledger;
pub mod performance;
pub mod utils;

// Re-export common types from the feed and performance modules
pub use feeds::*;
pub use ledger::*;
pub use performance::*;

// Re-export error types
pub use errors::Error;
pub use errors::FeedError;
pub use errors::Result;
