pub mod aggregator;
pub mod summary;
