//! Input loading, response formatting and CSV export.

pub mod export;
pub mod fleet;
pub mod report;
pub mod scenarios;
