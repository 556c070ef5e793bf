//! Engine configuration.

use serde::{Deserialize, Serialize};

/// How statement-of-position totals are labelled in the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalLabelStyle {
    /// `account_name` follows `class1`: "자산 [개요]" becomes "자산총계".
    #[default]
    Total,
    /// Totals are shortened to the section name ("자산총계" becomes "자산") on both
    /// `account_name` and `class1`.
    Section,
}

/// Columnar file format written for each filing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Apache Parquet.
    #[default]
    Parquet,
    /// Comma-separated values with a header row.
    Csv,
}

impl OutputFormat {
    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Parquet => "parquet",
            Self::Csv => "csv",
        }
    }
}

/// Configuration for [`XbrlEngine`](crate::XbrlEngine).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Restrict records to the period the filing reports on.
    pub period_filtering: bool,
    /// Label style for statement-of-position totals.
    pub total_labels: TotalLabelStyle,
    /// Output file format.
    pub output_format: OutputFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            period_filtering: true,
            total_labels: TotalLabelStyle::default(),
            output_format: OutputFormat::default(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable period filtering.
    #[must_use]
    pub const fn with_period_filtering(mut self, enabled: bool) -> Self {
        self.period_filtering = enabled;
        self
    }

    /// Set the total label style.
    #[must_use]
    pub const fn with_total_labels(mut self, style: TotalLabelStyle) -> Self {
        self.total_labels = style;
        self
    }

    /// Set the output format.
    #[must_use]
    pub const fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.period_filtering);
        assert_eq!(config.total_labels, TotalLabelStyle::Total);
        assert_eq!(config.output_format.extension(), "parquet");
    }

    #[test]
    fn test_partial_deserialize() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"total_labels": "section", "output_format": "csv"}"#)
                .unwrap();
        assert!(config.period_filtering);
        assert_eq!(config.total_labels, TotalLabelStyle::Section);
        assert_eq!(config.output_format, OutputFormat::Csv);
    }
}
