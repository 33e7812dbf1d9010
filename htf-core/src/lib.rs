pub mod daily;
pub mod date_range;
pub mod error;
pub mod ingest;
pub mod levels;
pub mod scenario;
pub mod station;
pub mod threshold;
pub mod unit;
