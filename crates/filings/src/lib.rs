#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Flattening of DART XBRL filings into analytics-ready records.
//!
//! This crate re-exports the core types, the entity directories and the
//! [`XbrlEngine`], and provides a [`FilingBatch`] for processing many filings
//! concurrently.
//!
//! # Features
//!
//! - `directory-sqlite` - SQLite-backed entity directory
//!
//! # Example
//!
//! ```rust,ignore
//! use filings::{BatchConfig, FilingBatch, FilingHints, FilingJob, JsonFileDirectory, XbrlEngine};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> filings::Result<()> {
//!     let directory = Arc::new(JsonFileDirectory::open("corp_list.json")?);
//!     let engine = XbrlEngine::new(directory);
//!
//!     let job = FilingJob::from_json_file("entity00171636_2025-06-30.json")?
//!         .with_hints(FilingHints::default().with_report_title("반기보고서 (2025.06)"));
//!
//!     let report = FilingBatch::new(engine, BatchConfig::new("output"))
//!         .run(vec![job])
//!         .await;
//!     println!("{report:?}");
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use filings_core::*;

// Directory implementations
#[cfg(feature = "directory-sqlite")]
pub use filings_directory::SqliteDirectory;
pub use filings_directory::{InMemoryDirectory, JsonFileDirectory, NoopDirectory};

// Engine
pub use filings_xbrl::{
    EngineConfig, FilingHints, FilingOutput, OUTPUT_COLUMNS, OutputFormat, TotalLabelStyle,
    XbrlEngine,
};

mod batch;
pub use batch::{BatchConfig, BatchReport, FilingBatch, FilingJob, MAX_REPORTED_ERRORS};
