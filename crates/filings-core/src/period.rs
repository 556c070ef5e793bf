//! Reporting period definitions.
//!
//! This module defines the period vocabulary shared by every stage:
//!
//! - [`DateToken`] - an 8-digit `YYYYMMDD` date as it appears in column keys
//! - [`PeriodToken`] - an instant (`YYYYMMDD`) or duration (`YYYYMMDD-YYYYMMDD`)
//! - [`YearMonth`] - the `YYYYMM` period a filing reports on
//! - [`PeriodBucket`] - the coarse period label written to the output

use crate::error::FilingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An 8-digit `YYYYMMDD` date token.
///
/// Only the shape is validated; the digits are kept verbatim so that formatting
/// never rejects a token the upstream parser produced.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct DateToken(String);

impl DateToken {
    /// Parses an 8-digit token, returning `None` for anything else.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        (s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit())).then(|| Self(s.to_string()))
    }

    /// Returns the 4-digit year.
    #[must_use]
    pub fn year(&self) -> &str {
        &self.0[..4]
    }

    /// Returns the 2-digit month.
    #[must_use]
    pub fn month(&self) -> &str {
        &self.0[4..6]
    }

    /// Returns the 2-digit day.
    #[must_use]
    pub fn day(&self) -> &str {
        &self.0[6..8]
    }

    /// Formats the token as `YYYY-MM-DD`.
    #[must_use]
    pub fn formatted(&self) -> String {
        format!("{}-{}-{}", self.year(), self.month(), self.day())
    }
}

impl TryFrom<String> for DateToken {
    type Error = FilingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| FilingError::Parse(format!("Invalid YYYYMMDD date: {s}")))
    }
}

impl fmt::Display for DateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The period a data column refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodToken {
    /// A single as-of date (`YYYYMMDD`).
    Instant(DateToken),
    /// A date range (`YYYYMMDD-YYYYMMDD`).
    Duration(DateToken, DateToken),
}

impl PeriodToken {
    /// Parses `YYYYMMDD` or `YYYYMMDD-YYYYMMDD`; the whole string must match.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(date) = DateToken::parse(s) {
            return Some(Self::Instant(date));
        }
        let (start, end) = s.split_once('-')?;
        Some(Self::Duration(DateToken::parse(start)?, DateToken::parse(end)?))
    }

    /// Formats the period as `YYYY-MM-DD` or `YYYY-MM-DD ~ YYYY-MM-DD`.
    #[must_use]
    pub fn formatted(&self) -> String {
        match self {
            Self::Instant(date) => date.formatted(),
            Self::Duration(start, end) => format!("{} ~ {}", start.formatted(), end.formatted()),
        }
    }
}

impl fmt::Display for PeriodToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instant(date) => write!(f, "{date}"),
            Self::Duration(start, end) => write!(f, "{start}-{end}"),
        }
    }
}

/// A `YYYYMM` reporting period.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct YearMonth(String);

impl YearMonth {
    /// Parses a 6-digit `YYYYMM` string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        (s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())).then(|| Self(s.to_string()))
    }

    /// Builds a period from a 4-digit year and a 2-digit month.
    ///
    /// Returns `None` when either part is empty or has the wrong width.
    #[must_use]
    pub fn from_parts(year: &str, month: &str) -> Option<Self> {
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        Self::parse(&format!("{year}{month}"))
    }

    /// Returns the 4-digit year.
    #[must_use]
    pub fn year(&self) -> &str {
        &self.0[..4]
    }

    /// Returns the 2-digit month.
    #[must_use]
    pub fn month(&self) -> &str {
        &self.0[4..]
    }

    /// Returns the compact `YYYYMM` form.
    #[must_use]
    pub fn compact(&self) -> &str {
        &self.0
    }

    /// Returns the `YYYY-MM` form used to match formatted period strings.
    #[must_use]
    pub fn dashed(&self) -> String {
        format!("{}-{}", self.year(), self.month())
    }
}

impl TryFrom<String> for YearMonth {
    type Error = FilingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| FilingError::Parse(format!("Invalid YYYYMM period: {s}")))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse period label written to the output `period` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodBucket {
    /// A period of at most three calendar months (or a single date).
    Quarterly,
    /// A year-to-date period longer than three months.
    Cumulative,
    /// The as-of balance of a statement of financial position.
    Current,
}

impl PeriodBucket {
    /// Returns the label stored in the output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Quarterly => "3개월",
            Self::Cumulative => "누적",
            Self::Current => "당기",
        }
    }
}

impl fmt::Display for PeriodBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
