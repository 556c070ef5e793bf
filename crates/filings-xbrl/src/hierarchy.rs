//! Statement-of-position hierarchy repair.
//!
//! The DART taxonomy tags the top of each balance-sheet section with an "overview"
//! placeholder, repeats the section total one level down, and adds a combined
//! liabilities-and-equity total. [`normalize`] rewrites these into one total row per
//! section that sorts directly before its children. Income-statement records are
//! never touched.

use filings_core::{FlatRecord, ReportType};
use tracing::debug;

/// Combined total dropped from the output.
pub const LIABILITIES_AND_EQUITY_TOTAL: &str = "자본과부채총계";

/// A top-level balance-sheet section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    /// 자산
    Assets,
    /// 부채
    Liabilities,
    /// 자본
    Equity,
}

impl Section {
    /// All sections, in balance-sheet order.
    pub const ALL: [Self; 3] = [Self::Assets, Self::Liabilities, Self::Equity];

    /// Placeholder label the taxonomy uses for the section.
    #[must_use]
    pub const fn overview(&self) -> &'static str {
        match self {
            Self::Assets => "자산 [개요]",
            Self::Liabilities => "부채 [개요]",
            Self::Equity => "자본 [개요]",
        }
    }

    /// Section total label.
    #[must_use]
    pub const fn total(&self) -> &'static str {
        match self {
            Self::Assets => "자산총계",
            Self::Liabilities => "부채총계",
            Self::Equity => "자본총계",
        }
    }

    /// Bare section name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Assets => "자산",
            Self::Liabilities => "부채",
            Self::Equity => "자본",
        }
    }

    /// Section whose overview placeholder is `label`.
    #[must_use]
    pub fn from_overview(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.overview() == label)
    }

    /// Section whose total is `label`.
    #[must_use]
    pub fn from_total(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.total() == label)
    }
}

fn is_position(record: &FlatRecord) -> bool {
    record.report_type == ReportType::StatementOfPosition
}

/// Repair the statement-of-position hierarchy in place.
///
/// Running it twice gives the same result as running it once.
pub fn normalize(records: &mut Vec<FlatRecord>) {
    // Overview placeholders become section totals.
    for record in records.iter_mut().filter(|r| is_position(r)) {
        if let Some(section) = Section::from_overview(&record.class1) {
            record.class1 = section.total().to_string();
        }
        if let Some(section) = Section::from_overview(&record.class2) {
            record.class2 = section.total().to_string();
        }
    }

    // A total that repeats itself one level down loses the duplicate.
    for record in records.iter_mut().filter(|r| is_position(r)) {
        if Section::from_total(&record.class1).is_some() && record.class2 == record.class1 {
            record.class2.clear();
        }
    }

    // Totals sort first in their section; assets first overall.
    for section in Section::ALL {
        let is_total = |r: &FlatRecord| {
            is_position(r) && r.class1 == section.total() && r.class2.is_empty()
        };
        let ordinal = match section {
            Section::Assets => Some(0),
            Section::Liabilities | Section::Equity => records
                .iter()
                .filter(|r| is_position(r) && r.class1 == section.total() && !r.class2.is_empty())
                .filter_map(|r| r.ordinal)
                .min(),
        };
        if let Some(ordinal) = ordinal {
            for record in records.iter_mut().filter(|r| is_total(r)) {
                record.ordinal = Some(ordinal);
            }
        }
    }

    let before = records.len();
    records.retain(|r| !(is_position(r) && r.label_local == LIABILITIES_AND_EQUITY_TOTAL));
    debug!(
        removed = before - records.len(),
        "Normalized statement-of-position hierarchy"
    );
}
