//! Filing to receipt-date side channel.
//!
//! The disclosure listing knows when a report was received; the report archive
//! does not. [`ReceiptDates`] carries that date from download to serialization,
//! keyed by the report's file name.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::Result;

/// Receipt dates (`YYYYMMDD`) keyed by report file name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptDates {
    dates: HashMap<String, String>,
}

impl ReceiptDates {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the receipt date of a report.
    ///
    /// Only the file name component of `path` is used as the key. Empty dates are ignored.
    pub fn register(&mut self, path: impl AsRef<Path>, receipt_date: &str) {
        let receipt_date = receipt_date.trim();
        let Some(key) = file_key(path.as_ref()) else {
            return;
        };
        if receipt_date.is_empty() {
            debug!(file = %key, "Empty receipt date, not registered");
            return;
        }
        debug!(file = %key, receipt_date, "Registered receipt date");
        self.dates.insert(key, receipt_date.to_string());
    }

    /// Looks up the receipt date registered for a report.
    #[must_use]
    pub fn lookup(&self, path: impl AsRef<Path>) -> Option<&str> {
        let key = file_key(path.as_ref())?;
        self.dates.get(&key).map(String::as_str)
    }

    /// Returns the number of registered reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Loads a mapping saved with [`save_json`](Self::save_json).
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a JSON object of strings.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Saves the mapping as a JSON object.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn file_key(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}
