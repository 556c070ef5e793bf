#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Entity directory implementations.
//!
//! This crate provides implementations of the [`EntityDirectory`] trait from `filings-core`:
//!
//! - [`JsonFileDirectory`] - `corp_list.json` loaded from the first readable candidate path
//! - [`SqliteDirectory`] - Persistent SQLite-backed directory (requires `sqlite` feature)
//! - [`InMemoryDirectory`] - Simple in-memory directory for testing
//! - [`NoopDirectory`] - Directory that knows no companies

/// Corp code normalization.
pub mod code;
/// JSON corp-list directory implementation.
pub mod json;
/// In-memory directory implementation.
pub mod memory;
/// No-op directory implementation.
pub mod noop;

/// SQLite-backed directory implementation.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the trait for convenience
pub use filings_core::EntityDirectory;

// Re-export implementations
pub use code::normalize_corp_code;
pub use json::{JsonFileDirectory, parse_corp_list};
pub use memory::InMemoryDirectory;
pub use noop::NoopDirectory;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDirectory;
