pub mod feed_model;
pub mod feed_traits;

pub use feed_model::*;
pub use feed_traits::*;
