//! Per-step extraction outcomes.
//!
//! Each metadata step either finds its value or falls back to a default. The
//! fallback is recorded as a [`Degradation`] so callers can see exactly which
//! fields of a filing were guessed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ReportType;

/// A recoverable, per-filing problem that was replaced by a default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Degradation {
    /// No `entity{8 digits}` token in the file name (or no file name at all).
    MissingEntityCode,
    /// The directory had no name for the corp code, even after a reload.
    EntityNameFallback {
        /// Corp code that could not be resolved.
        entity_code: String,
    },
    /// The period-information table had no `YYYYMMDD-YYYYMMDD` column.
    MissingReportingPeriod,
    /// No report title carried a `(YYYY.MM)` marker.
    MissingReportTitle,
    /// No usable receipt date; the serialization date was used.
    ReceiptDateFallback,
    /// A statement table could not be read and was treated as absent.
    StatementUnreadable {
        /// Statement that failed.
        report_type: ReportType,
        /// Reason reported by the source.
        reason: String,
    },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEntityCode => f.write_str("entity code not found, using 00000000"),
            Self::EntityNameFallback { entity_code } => {
                write!(f, "no company name for {entity_code}, using placeholder")
            }
            Self::MissingReportingPeriod => f.write_str("reporting period not found"),
            Self::MissingReportTitle => f.write_str("report title has no (YYYY.MM) marker"),
            Self::ReceiptDateFallback => f.write_str("receipt date missing, using today"),
            Self::StatementUnreadable {
                report_type,
                reason,
            } => write!(f, "{report_type} table unreadable: {reason}"),
        }
    }
}

/// Result of one extraction step: the found value or a degraded default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extracted<T> {
    /// The value was found in the input.
    Found(T),
    /// The value is a default standing in for missing input.
    Degraded(T, Degradation),
}

impl<T> Extracted<T> {
    /// Returns the value, found or defaulted.
    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            Self::Found(value) | Self::Degraded(value, _) => value,
        }
    }

    /// Returns the degradation, if the value was defaulted.
    #[must_use]
    pub const fn degradation(&self) -> Option<&Degradation> {
        match self {
            Self::Found(_) => None,
            Self::Degraded(_, degradation) => Some(degradation),
        }
    }

    /// Returns true if the value came from the input.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Splits into the value and the optional degradation.
    #[must_use]
    pub fn into_parts(self) -> (T, Option<Degradation>) {
        match self {
            Self::Found(value) => (value, None),
            Self::Degraded(value, degradation) => (value, Some(degradation)),
        }
    }
}
