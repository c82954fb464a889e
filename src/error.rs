//! Error type shared by every pipeline stage.

use thiserror::Error;

/// Failures the scoring pipeline surfaces to its caller.
///
/// A missing feeder baseline is not represented here: it is an expected
/// outcome and is modelled as `None` by the resolver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RaterError {
    /// A field that must parse (Grade Level, Year) could not be read.
    #[error("row {row}: cannot parse {field} '{value}': {reason}")]
    Parse {
        row: usize,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("computation error: {0}")]
    Computation(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, RaterError>;
