//! Error kinds shared by loading, simulation and reporting.

use thiserror::Error;

/// Closed set of failures surfaced by the crate.
///
/// `NotFound`, `InvalidSelection`, `ValidationFailed` and `OutputNotSupported`
/// are user input errors. `ComputationFailed` aborts one
/// (vehicle, scenario, strategy) run. The wrapped I/O variants only occur at the
/// loading and export boundary.
#[derive(Debug, Error)]
pub enum TcoError {
    /// A referenced scenario, scenario year or input file does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Unknown scenario or strategy name in a selection.
    #[error("invalid selection: {kind} \"{name}\" is not recognised")]
    InvalidSelection { kind: &'static str, name: String },
    /// Input records failed validation.
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    /// A value required inside the simulation loop could not be computed.
    #[error("computation failed: {0}")]
    ComputationFailed(String),
    /// None of the requested output sections can be produced.
    #[error("the selected output is not supported, expected one of: graphs, input, results")]
    OutputNotSupported,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TcoError {
    pub(crate) fn invalid_scenario(name: &str) -> Self {
        Self::InvalidSelection {
            kind: "scenario",
            name: name.to_string(),
        }
    }

    pub(crate) fn invalid_strategy(name: &str) -> Self {
        Self::InvalidSelection {
            kind: "strategy",
            name: name.to_string(),
        }
    }

    /// True for errors caused by the caller's input rather than an internal fault.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::InvalidSelection { .. }
                | Self::ValidationFailed(_)
                | Self::OutputNotSupported
        )
    }
}
