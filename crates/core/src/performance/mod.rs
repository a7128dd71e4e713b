pub mod aggregate_service;
pub mod performance_model;
pub mod returns_service;
pub mod series_ops;
pub mod stats_calculator;
pub mod today_synthesizer;
pub mod twr_calculator;

#[cfg(test)]
mod aggregate_service_tests;

pub use aggregate_service::{AggregateReturnsService, AggregateReturnsServiceTrait};
pub use performance_model::*;
pub use returns_service::{AccountReturnsService, AccountReturnsServiceTrait};
pub use series_ops::*;
pub use stats_calculator::*;
pub use today_synthesizer::{append_or_update_today, OverlayScope, TodaySynthesizer};
pub use twr_calculator::*;
