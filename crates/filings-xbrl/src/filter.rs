//! Reporting-period filter.
//!
//! A DART matrix carries comparative periods (prior year end, prior quarter) next
//! to the period the filing reports on. The filter keeps a record iff its formatted
//! period contains the target `YYYY-MM` as a substring. This is a deliberate
//! approximation: it keeps instants and ranges that end in the target month, and
//! drops ranges that only overlap it.

use filings_core::{Degradation, Extracted, FilingMetadata, FlatRecord, YearMonth};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static TITLE_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4})\.(\d{2})\)").expect("title period pattern is valid"));

/// Extract the `(YYYY.MM)` marker from a disclosure title.
#[must_use]
pub fn period_from_title(title: &str) -> Option<YearMonth> {
    let caps = TITLE_PERIOD.captures(title)?;
    YearMonth::from_parts(caps.get(1)?.as_str(), caps.get(2)?.as_str())
}

/// Determine the period a filing reports on.
///
/// The report title marker wins; otherwise the metadata's reporting year and month
/// are used. `None` means no filtering is possible.
#[must_use]
pub fn target_period(metadata: &FilingMetadata) -> Extracted<Option<YearMonth>> {
    if let Some(period) = metadata.report_title.as_deref().and_then(period_from_title) {
        return Extracted::Found(Some(period));
    }
    let fallback = YearMonth::from_parts(&metadata.reporting_year, &metadata.reporting_month);
    Extracted::Degraded(fallback, Degradation::MissingReportTitle)
}

/// Keep only records whose period contains the target `YYYY-MM`.
#[must_use]
pub fn filter_records(records: Vec<FlatRecord>, target: &YearMonth) -> Vec<FlatRecord> {
    let needle = target.dashed();
    let before = records.len();
    let kept: Vec<FlatRecord> = records
        .into_iter()
        .filter(|record| record.period.contains(&needle))
        .collect();
    debug!(
        target = %target,
        before,
        after = kept.len(),
        "Filtered records by reporting period"
    );
    kept
}
