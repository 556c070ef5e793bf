//! Core data types for statement flattening.
//!
//! This module defines the input and output shapes of the engine:
//!
//! - [`ColumnLabel`] / [`CellValue`] - raw column identifiers and cells from the parser
//! - [`StatementTable`] / [`StatementMatrix`] - one filing's labeled matrices
//! - [`ReportType`] / [`Scope`] - statement kind and consolidation scope
//! - [`FilingMetadata`] - identity of the filing being processed
//! - [`FlatRecord`] - one (concept, period, scope) amount
//! - [`OutputRecord`] - a flat record mapped to the output contract

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{FilingError, Result};
use crate::provider::FilingSource;

/// Kind of financial statement a table holds.
///
/// The derived ordering puts the statement of financial position first, which is
/// the order records are emitted in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReportType {
    /// Statement of financial position (balance sheet).
    #[serde(rename = "BS")]
    StatementOfPosition,
    /// Statement of comprehensive income.
    #[serde(rename = "CIS")]
    IncomeStatement,
}

impl ReportType {
    /// All report types in emission order.
    pub const ALL: [Self; 2] = [Self::StatementOfPosition, Self::IncomeStatement];

    /// Returns the short code stored in the `report_type` column.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::StatementOfPosition => "BS",
            Self::IncomeStatement => "CIS",
        }
    }

    /// Returns the human-readable report name.
    #[must_use]
    pub const fn report_name(&self) -> &'static str {
        match self {
            Self::StatementOfPosition => "재무상태표",
            Self::IncomeStatement => "포괄손익계산서",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Marker contained in consolidated-statement scope tokens.
pub const CONSOLIDATED_MARKER: &str = "연결";
/// Marker contained in separate-statement scope tokens.
pub const SEPARATE_MARKER: &str = "별도";

/// Consolidation scope of an amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Consolidated financial statements.
    #[default]
    Consolidated,
    /// Separate financial statements.
    Separate,
}

impl Scope {
    /// Decodes a scope token such as `연결재무제표` or `별도재무제표`.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        if token.contains(CONSOLIDATED_MARKER) {
            Self::Consolidated
        } else {
            Self::Separate
        }
    }

    /// Reads a scope hint embedded in a free-form column name.
    ///
    /// Defaults to consolidated when neither marker is present.
    #[must_use]
    pub fn from_hint(text: &str) -> Self {
        if text.contains(CONSOLIDATED_MARKER) {
            Self::Consolidated
        } else if text.contains(SEPARATE_MARKER) {
            Self::Separate
        } else {
            Self::Consolidated
        }
    }

    /// Returns the label stored in the `scope` column.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Consolidated => CONSOLIDATED_MARKER,
            Self::Separate => SEPARATE_MARKER,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Second component of a compound column identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelPart {
    /// A field name, e.g. `label_ko`.
    Name(String),
    /// Scope tokens, e.g. `["연결재무제표"]`.
    Tokens(Vec<String>),
}

/// A raw column identifier as produced by the upstream parser.
///
/// In JSON a plain label is a string and a compound label is a two-element array:
/// `"concept_id"`, `["D210000", "label_ko"]`, `["20250630", ["연결재무제표"]]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnLabel {
    /// A bare column name.
    Plain(String),
    /// A `(first, second)` pair.
    Compound(String, LabelPart),
}

impl ColumnLabel {
    /// Creates a plain label.
    #[must_use]
    pub fn plain(name: impl Into<String>) -> Self {
        Self::Plain(name.into())
    }

    /// Creates a compound label whose second component is a field name.
    #[must_use]
    pub fn field(statement: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Compound(statement.into(), LabelPart::Name(name.into()))
    }

    /// Creates a compound period label with a single scope token.
    #[must_use]
    pub fn period(date: impl Into<String>, scope: impl Into<String>) -> Self {
        Self::Compound(date.into(), LabelPart::Tokens(vec![scope.into()]))
    }

    /// Returns the first component (the whole name for plain labels).
    #[must_use]
    pub fn head(&self) -> &str {
        match self {
            Self::Plain(name) | Self::Compound(name, _) => name,
        }
    }
}

impl fmt::Display for ColumnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(name) => f.write_str(name),
            Self::Compound(head, LabelPart::Name(name)) => write!(f, "({head}, {name})"),
            Self::Compound(head, LabelPart::Tokens(tokens)) => {
                write!(f, "({head}, ({}))", tokens.join(", "))
            }
        }
    }
}

/// A single cell of a statement table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing value.
    #[default]
    Null,
    /// Boolean cell (never numeric).
    Bool(bool),
    /// Numeric cell.
    Number(f64),
    /// Text cell.
    Text(String),
}

impl CellValue {
    /// Coerces the cell to a finite number, if possible.
    ///
    /// Text cells are trimmed and parsed; nulls, booleans and non-finite values yield `None`.
    #[must_use]
    pub fn numeric(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Null | Self::Bool(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Renders the cell as label text; nulls become the empty string.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Reads the cell as an integral ordinal.
    #[must_use]
    pub fn ordinal(&self) -> Option<i64> {
        match self {
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
            Self::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Row-major statement table: fixed metadata columns followed by data columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementTable {
    /// Column identifiers in source order.
    pub columns: Vec<ColumnLabel>,
    /// Rows in source order; each row is aligned with `columns`.
    #[serde(default)]
    pub rows: Vec<Vec<CellValue>>,
}

impl StatementTable {
    /// Creates a table with the given columns and no rows.
    #[must_use]
    pub const fn new(columns: Vec<ColumnLabel>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    #[must_use]
    pub fn with_row(mut self, row: Vec<CellValue>) -> Self {
        self.rows.push(row);
        self
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the cell at `(row, column)`, treating ragged rows as null-padded.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        const NULL: &CellValue = &CellValue::Null;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(NULL)
    }
}

/// One filing's labeled matrices, as dumped by the upstream XBRL parser.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementMatrix {
    /// File name of the source report, e.g. `entity00171636_2025-06-30.xbrl`.
    #[serde(default)]
    pub filename: Option<String>,
    /// Column identifiers of the period-information table.
    #[serde(default)]
    pub period_information: Vec<ColumnLabel>,
    /// Consolidated statement of financial position.
    #[serde(default)]
    pub statement_of_position: Option<StatementTable>,
    /// Consolidated statement of comprehensive income.
    #[serde(default)]
    pub income_statement: Option<StatementTable>,
}

impl StatementMatrix {
    /// Parses a matrix from its JSON dump.
    ///
    /// # Errors
    /// Returns [`FilingError::Parse`] if the JSON does not match the matrix shape.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a matrix from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Sets the table for a report type.
    #[must_use]
    pub fn with_statement(mut self, report_type: ReportType, table: StatementTable) -> Self {
        match report_type {
            ReportType::StatementOfPosition => self.statement_of_position = Some(table),
            ReportType::IncomeStatement => self.income_statement = Some(table),
        }
        self
    }
}

impl FilingSource for StatementMatrix {
    fn filename(&self) -> Result<String> {
        self.filename
            .clone()
            .ok_or_else(|| FilingError::Source("Matrix has no file name".to_string()))
    }

    fn period_information(&self) -> Result<Vec<ColumnLabel>> {
        Ok(self.period_information.clone())
    }

    fn statement(&self, report_type: ReportType) -> Result<Option<StatementTable>> {
        Ok(match report_type {
            ReportType::StatementOfPosition => self.statement_of_position.clone(),
            ReportType::IncomeStatement => self.income_statement.clone(),
        })
    }
}

/// Identity of a filing, derived once and immutable afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingMetadata {
    /// 8-digit zero-padded DART corp code.
    pub entity_code: String,
    /// Company name from the entity directory (or a placeholder).
    pub entity_name: String,
    /// 4-digit reporting year, or empty when unknown.
    pub reporting_year: String,
    /// 2-digit reporting month, or empty when unknown.
    pub reporting_month: String,
    /// Disclosure title such as `반기보고서 (2025.06)`.
    pub report_title: Option<String>,
    /// Receipt date as `YYYYMMDD`.
    pub receipt_date: Option<String>,
}

/// One non-zero amount for a (concept, period, scope) triple.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    /// Source row order; the only stable sort key once labels are rewritten.
    pub ordinal: Option<i64>,
    /// 8-digit corp code.
    pub entity_code: String,
    /// Company name.
    pub entity_name: String,
    /// 4-digit reporting year (may be empty).
    pub reporting_year: String,
    /// 2-digit reporting month (may be empty).
    pub reporting_month: String,
    /// Statement the record came from.
    pub report_type: ReportType,
    /// IFRS concept identifier.
    pub concept_id: String,
    /// Korean label.
    pub label_local: String,
    /// English label.
    pub label_en: String,
    /// Coarsest classification level.
    pub class0: String,
    /// Second classification level.
    pub class1: String,
    /// Third classification level.
    pub class2: String,
    /// Finest classification level.
    pub class3: String,
    /// Consolidation scope.
    pub scope: Scope,
    /// Formatted period (`YYYY-MM-DD` or `YYYY-MM-DD ~ YYYY-MM-DD`) or a raw label.
    pub period: String,
    /// Signed, non-zero amount.
    pub amount: f64,
}

/// A flat record mapped to the output column contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Source row order.
    pub ordinal: Option<i64>,
    /// 8-digit corp code.
    pub entity_code: String,
    /// 4-digit reporting year.
    pub reporting_year: String,
    /// 2-digit reporting month.
    pub reporting_month: String,
    /// IFRS concept identifier.
    pub account_id: String,
    /// Korean account name.
    pub account_name: String,
    /// English account name.
    pub account_name_en: String,
    /// Coarsest classification level.
    pub class0: String,
    /// Second classification level.
    pub class1: String,
    /// Third classification level.
    pub class2: String,
    /// Account id whose name equals `class1`, or empty.
    pub class1_id: String,
    /// Account id whose name equals `class2`, or empty.
    pub class2_id: String,
    /// Account id whose name equals `class3`, or empty.
    pub class3_id: String,
    /// Consolidation scope label.
    pub scope: String,
    /// Coarse period bucket label.
    pub period: String,
    /// Signed, non-zero amount.
    pub amount: f64,
    /// Statement code (`BS` / `CIS`).
    pub report_type: ReportType,
    /// Human-readable statement name.
    pub report_name: String,
    /// Receipt date as `YYYY-MM-DD`.
    pub receipt_date: String,
    /// Serialization wall-clock time.
    pub crawl_time: NaiveDateTime,
    /// Company name.
    pub entity_name: String,
    /// Finest classification level.
    pub class3: String,
}
