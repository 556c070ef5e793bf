//! Error types for filing processing.
//!
//! This module defines [`FilingError`], which covers the per-filing failures the
//! engine can report. Recoverable problems (a missing corp name, a report without
//! a title) are not errors; they surface as [`Degradation`](crate::Degradation)s.

use thiserror::Error;

/// Errors that can occur while processing a single filing.
#[derive(Error, Debug)]
pub enum FilingError {
    /// The filing produced no records.
    ///
    /// Both statement tables were absent or empty, or every cell was filtered out.
    #[error("No data produced for {filename}")]
    NoData {
        /// File name of the filing that yielded nothing.
        filename: String,
    },

    /// The upstream statement source could not be read.
    #[error("Source error: {0}")]
    Source(String),

    /// The entity directory failed to answer a lookup or reload.
    #[error("Directory error: {0}")]
    Directory(String),

    /// Error parsing input data.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error building or writing the columnar output.
    #[error("Output error: {0}")]
    Output(String),

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl FilingError {
    /// Returns true if this is the "no data produced" outcome rather than a failure.
    #[must_use]
    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

impl From<serde_json::Error> for FilingError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Result type alias using [`FilingError`].
pub type Result<T> = std::result::Result<T, FilingError>;
