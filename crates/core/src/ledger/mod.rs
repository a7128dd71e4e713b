pub mod ledger_model;
pub mod ledger_service;


pub use ledger_model::*;
pub use ledger_service::LedgerAggregator;
