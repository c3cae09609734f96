//! Fleet electrification total-cost-of-ownership model.

pub mod cli;
pub mod config;
/// Vehicles, fleets and cost scenarios.
pub mod domain;
pub mod error;
/// Fleet and scenario loading, response formatting and CSV export.
pub mod io;
pub mod logging;
/// Cost model driven by the replacement strategies.
pub mod oracle;
pub mod presets;
/// Strategy engine, orchestration and KPIs.
pub mod sim;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::TcoError;
