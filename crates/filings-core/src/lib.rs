#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and traits for flattening DART financial statements.
//!
//! This crate provides the shared vocabulary of the workspace:
//!
//! - [`FilingSource`](provider::FilingSource) - A parsed XBRL report
//! - [`EntityDirectory`](provider::EntityDirectory) - Corp code to corp name lookup
//! - [`ReceiptDates`](receipts::ReceiptDates) - Receipt-date side channel
//! - [`FlatRecord`](types::FlatRecord) / [`OutputRecord`](types::OutputRecord) - Engine output
//! - [`Degradation`](outcome::Degradation) - Recoverable per-filing fallbacks

/// Error types for filing processing.
pub mod error;
/// Per-step extraction outcomes.
pub mod outcome;
/// Reporting period definitions.
pub mod period;
/// Collaborator traits.
pub mod provider;
/// Receipt-date side channel.
pub mod receipts;
/// Core data types (matrices, records, report types).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{FilingError, Result};
pub use outcome::{Degradation, Extracted};
pub use period::{DateToken, PeriodBucket, PeriodToken, YearMonth};
pub use provider::{EntityDirectory, FilingSource};
pub use receipts::ReceiptDates;
pub use types::{
    CellValue, ColumnLabel, FilingMetadata, FlatRecord, LabelPart, OutputRecord, ReportType,
    Scope, StatementMatrix, StatementTable,
};
