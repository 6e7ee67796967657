//! Error types shared by every part of the network engine.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building, editing or training a
/// network.
///
/// All failures are reported before anything is mutated, so a failed call
/// leaves the network exactly as it was.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// Two containers disagree on a dimension.
    #[error("shape mismatch ({context}): expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A network, strategy or training run was configured with values that
    /// make no sense.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A collaborator could not provide the data it was asked for.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),
}

/// Fails with `ShapeMismatch` unless `expected == actual`.
pub(crate) fn check_len(
    context: &'static str,
    expected: usize,
    actual: usize,
) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            context,
            expected,
            actual,
        })
    }
}
