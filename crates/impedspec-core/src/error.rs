//! Error types
//!
//! Every fallible operation in the numeric core returns [`ImpedanceError`].
//! Complex arithmetic itself never fails: division by zero and similar domain
//! errors surface as IEEE NaN/Inf values.

use thiserror::Error;

/// Errors raised by the model library, the simulation and the regression engine
#[derive(Error, Debug)]
pub enum ImpedanceError {
    #[error("The number of {expected_what}, {expected}, does not equal the number of {found_what}, {found}")]
    DimensionMismatch {
        expected_what: String,
        expected: usize,
        found_what: String,
        found: usize,
    },

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Degrees of freedom, {0}, are less than 1")]
    InvalidDegreesOfFreedom(isize),

    #[error("No model {0} exists; model numbers lie between 1 and 44 inclusive")]
    UnknownModel(usize),

    #[error("Automatically calculated initial estimates are only available for models 1 to 28, not model {0}")]
    NoAutomaticEstimates(usize),

    #[error("Parameter symbol, {0}, not found")]
    SymbolNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Singular matrix")]
    SingularMatrix,

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImpedanceError {
    /// Dimension mismatch against the number of frequencies
    pub(crate) fn frequencies_vs(found_what: &str, expected: usize, found: usize) -> Self {
        ImpedanceError::DimensionMismatch {
            expected_what: "frequencies".to_string(),
            expected,
            found_what: found_what.to_string(),
            found,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ImpedanceError>;

/// Check that a parallel array has the same length as the frequency array
pub(crate) fn check_len(what: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(ImpedanceError::frequencies_vs(what, expected, found));
    }
    Ok(())
}
