#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Flattening engine for DART XBRL statement matrices.
//!
//! [`XbrlEngine::process`] runs a filing through these stages:
//!
//! - [`metadata`] - corp code, corp name and reporting period
//! - [`structure`] - column classification into fields and period columns
//! - [`pivot`] - one record per non-zero numeric cell
//! - [`filter`] - restriction to the reported period
//! - [`hierarchy`] - balance-sheet total repair
//! - [`schema`] - output contract mapping, written by [`output`]

/// Engine configuration.
pub mod config;
/// The filing pipeline.
pub mod engine;
/// Reporting-period filter.
pub mod filter;
/// Statement-of-position hierarchy repair.
pub mod hierarchy;
/// Filing identity extraction.
pub mod metadata;
/// Columnar file output.
pub mod output;
/// Matrix to flat records.
pub mod pivot;
/// Output contract mapping.
pub mod schema;
/// Column classification.
pub mod structure;

pub use config::{EngineConfig, OutputFormat, TotalLabelStyle};
pub use engine::{FilingOutput, XbrlEngine};
pub use metadata::FilingHints;
pub use schema::OUTPUT_COLUMNS;
pub use structure::{ColumnKey, FieldName, PeriodKey, TableLayout};
