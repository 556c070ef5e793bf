//! In-memory directory implementation.

use crate::code::normalize_corp_code;
use filings_core::{EntityDirectory, FilingError, Result};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, instrument};

/// Simple in-memory directory for testing and embedding.
///
/// Entries added with [`insert`](Self::insert) are visible immediately. Entries added
/// with [`stage`](Self::stage) only become visible after [`reload`](EntityDirectory::reload),
/// which models a backing store that was updated after the directory was loaded.
///
/// Codes are stored and looked up in [`normalize_corp_code`] form.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    entries: RwLock<HashMap<String, String>>,
    staged: RwLock<HashMap<String, String>>,
}

impl InMemoryDirectory {
    /// Create a new empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory from `(corp_code, corp_name)` pairs.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (normalize_corp_code(k.as_ref()), v.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
            staged: RwLock::default(),
        }
    }

    /// Add an entry that is visible immediately.
    ///
    /// # Errors
    /// Returns an error if the lock is poisoned.
    pub fn insert(&self, entity_code: &str, name: impl Into<String>) -> Result<()> {
        self.entries
            .write()
            .map_err(|e| FilingError::Directory(e.to_string()))?
            .insert(normalize_corp_code(entity_code), name.into());
        Ok(())
    }

    /// Add an entry that becomes visible on the next reload.
    ///
    /// # Errors
    /// Returns an error if the lock is poisoned.
    pub fn stage(&self, entity_code: &str, name: impl Into<String>) -> Result<()> {
        self.staged
            .write()
            .map_err(|e| FilingError::Directory(e.to_string()))?
            .insert(normalize_corp_code(entity_code), name.into());
        Ok(())
    }

    /// Returns the number of visible entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true if no entries are visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EntityDirectory for InMemoryDirectory {
    fn name(&self) -> &str {
        "in-memory"
    }

    #[instrument(skip(self))]
    fn lookup(&self, entity_code: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| FilingError::Directory(e.to_string()))?;
        match entries.get(&normalize_corp_code(entity_code)) {
            Some(name) => {
                debug!("Directory hit");
                Ok(Some(name.clone()))
            }
            None => {
                debug!("Directory miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    fn reload(&self) -> Result<()> {
        let staged: Vec<(String, String)> = self
            .staged
            .write()
            .map_err(|e| FilingError::Directory(e.to_string()))?
            .drain()
            .collect();
        let count = staged.len();
        self.entries
            .write()
            .map_err(|e| FilingError::Directory(e.to_string()))?
            .extend(staged);
        debug!("Reloaded {} staged entries", count);
        Ok(())
    }
}
