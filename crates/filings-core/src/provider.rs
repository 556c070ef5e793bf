//! Collaborator traits consumed by the engine.
//!
//! This module defines the two seams the engine reads through:
//!
//! - [`FilingSource`] - one parsed XBRL report (file name, period table, statements)
//! - [`EntityDirectory`] - read-only corp code to corp name lookup

use std::fmt::Debug;

use crate::{
    error::Result,
    types::{ColumnLabel, ReportType, StatementTable},
};

/// A parsed tagged report for one filing.
///
/// Every accessor may fail independently; the engine degrades each failure on its
/// own instead of abandoning the filing.
pub trait FilingSource: Send + Sync + Debug {
    /// Returns the report's file name, e.g. `entity00171636_2025-06-30.xbrl`.
    fn filename(&self) -> Result<String>;

    /// Returns the column identifiers of the period-information table.
    fn period_information(&self) -> Result<Vec<ColumnLabel>>;

    /// Returns the consolidated table for a report type, if the report has one.
    fn statement(&self, report_type: ReportType) -> Result<Option<StatementTable>>;
}

/// Read-only directory of company names keyed by 8-digit corp code.
///
/// Implementations use interior mutability for [`reload`](Self::reload) so one
/// directory can be shared by concurrent workers.
pub trait EntityDirectory: Send + Sync + Debug {
    /// Returns the name of this directory (e.g. "corp_list.json").
    fn name(&self) -> &str;

    /// Looks up a company name, returning `Ok(None)` when the code is unknown.
    fn lookup(&self, entity_code: &str) -> Result<Option<String>>;

    /// Refreshes the directory from its backing store.
    fn reload(&self) -> Result<()>;
}
