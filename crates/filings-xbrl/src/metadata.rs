//! Filing identity extraction.
//!
//! Derives the corp code from the XBRL file name, resolves the corp name through an
//! [`EntityDirectory`], and reads the reporting year and month from the
//! period-information table. Each step returns an [`Extracted`] value: a missing
//! input becomes a default plus a [`Degradation`], never an error.

use filings_core::{
    ColumnLabel, DateToken, Degradation, EntityDirectory, Extracted, FilingMetadata,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Corp code used when the file name carries none.
pub const UNKNOWN_ENTITY_CODE: &str = "00000000";

static ENTITY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"entity(\d{8})").expect("entity code pattern is valid"));

static PERIOD_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{8})-(\d{8})").expect("period range pattern is valid"));

/// Caller-supplied facts about a filing that the matrix itself does not carry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilingHints {
    /// Disclosure title, e.g. "반기보고서 (2025.06)".
    pub report_title: Option<String>,
    /// Receipt date as `YYYYMMDD` (dashes allowed).
    pub receipt_date: Option<String>,
}

impl FilingHints {
    /// Hints with a report title.
    #[must_use]
    pub fn with_report_title(mut self, title: impl Into<String>) -> Self {
        self.report_title = Some(title.into());
        self
    }

    /// Hints with a receipt date.
    #[must_use]
    pub fn with_receipt_date(mut self, date: impl Into<String>) -> Self {
        self.receipt_date = Some(date.into());
        self
    }
}

/// Extract the 8-digit corp code following `entity` in a file name.
#[must_use]
pub fn extract_entity_code(filename: Option<&str>) -> Extracted<String> {
    let code = filename
        .and_then(|name| ENTITY_CODE.captures(name))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    match code {
        Some(code) => Extracted::Found(code),
        None => Extracted::Degraded(
            UNKNOWN_ENTITY_CODE.to_string(),
            Degradation::MissingEntityCode,
        ),
    }
}

/// Resolve a corp name, reloading the directory once on a miss.
///
/// Directory errors are logged and treated as misses.
#[must_use]
pub fn resolve_entity_name(directory: &dyn EntityDirectory, entity_code: &str) -> Extracted<String> {
    if let Some(name) = lookup(directory, entity_code) {
        return Extracted::Found(name);
    }

    debug!(entity_code, directory = directory.name(), "Name not found, reloading directory");
    if let Err(e) = directory.reload() {
        warn!(entity_code, error = %e, "Directory reload failed");
    }

    match lookup(directory, entity_code) {
        Some(name) => Extracted::Found(name),
        None => Extracted::Degraded(
            format!("Corp_{entity_code}"),
            Degradation::EntityNameFallback {
                entity_code: entity_code.to_string(),
            },
        ),
    }
}

fn lookup(directory: &dyn EntityDirectory, entity_code: &str) -> Option<String> {
    match directory.lookup(entity_code) {
        Ok(name) => name,
        Err(e) => {
            warn!(entity_code, error = %e, "Directory lookup failed");
            None
        }
    }
}

/// Read the reporting period end date from the period-information columns.
///
/// The first column whose key starts with `YYYYMMDD-YYYYMMDD` wins.
#[must_use]
pub fn extract_reporting_period(period_information: &[ColumnLabel]) -> Extracted<Option<DateToken>> {
    let end = period_information.iter().find_map(|label| {
        PERIOD_RANGE
            .captures(label.head())
            .and_then(|caps| caps.get(2))
            .and_then(|m| DateToken::parse(m.as_str()))
    });

    match end {
        Some(date) => Extracted::Found(Some(date)),
        None => Extracted::Degraded(None, Degradation::MissingReportingPeriod),
    }
}

/// Assemble filing metadata, collecting every degradation along the way.
#[must_use]
pub fn extract_metadata(
    filename: Option<&str>,
    period_information: &[ColumnLabel],
    directory: &dyn EntityDirectory,
    hints: &FilingHints,
) -> (FilingMetadata, Vec<Degradation>) {
    let mut degradations = Vec::new();

    let (entity_code, degradation) = extract_entity_code(filename).into_parts();
    degradations.extend(degradation);

    let (entity_name, degradation) = resolve_entity_name(directory, &entity_code).into_parts();
    degradations.extend(degradation);

    let (period_end, degradation) = extract_reporting_period(period_information).into_parts();
    degradations.extend(degradation);

    let (reporting_year, reporting_month) = period_end
        .map(|date| (date.year().to_string(), date.month().to_string()))
        .unwrap_or_default();

    let metadata = FilingMetadata {
        entity_code,
        entity_name,
        reporting_year,
        reporting_month,
        report_title: hints.report_title.clone(),
        receipt_date: hints.receipt_date.clone(),
    };
    debug!(
        entity_code = %metadata.entity_code,
        entity_name = %metadata.entity_name,
        year = %metadata.reporting_year,
        month = %metadata.reporting_month,
        "Extracted filing metadata"
    );
    (metadata, degradations)
}
