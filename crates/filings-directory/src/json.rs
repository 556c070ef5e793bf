//! JSON corp-list directory implementation.
//!
//! Reads the `corp_list.json` dump of the DART corp-code list:
//!
//! ```text
//! [{"corp_code": "00171636", "name": "SK텔레콤"}, ...]
//! ```

use crate::code::normalize_corp_code;
use filings_core::{EntityDirectory, FilingError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// A corp code that may have been exported as a number (losing its leading zeros).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CorpCode {
    Text(String),
    Number(u64),
}

impl CorpCode {
    fn padded(&self) -> String {
        match self {
            Self::Text(s) => normalize_corp_code(s),
            Self::Number(n) => format!("{n:08}"),
        }
    }
}

/// One entry of the corp list.
#[derive(Debug, Deserialize)]
struct CorpEntry {
    corp_code: CorpCode,
    #[serde(alias = "corp_name")]
    name: String,
}

/// Parses a corp list into a map keyed by 8-digit zero-padded corp code.
///
/// # Errors
/// Returns [`FilingError::Parse`] if the JSON is not a list of corp entries.
pub fn parse_corp_list(json: &str) -> Result<HashMap<String, String>> {
    let entries: Vec<CorpEntry> = serde_json::from_str(json)?;
    Ok(entries
        .into_iter()
        .map(|entry| (entry.corp_code.padded(), entry.name))
        .collect())
}

/// Directory backed by a `corp_list.json` file.
///
/// The file is looked up in a list of candidate paths; the first one that can be
/// read and parsed wins. [`reload`](EntityDirectory::reload) repeats the search.
#[derive(Debug)]
pub struct JsonFileDirectory {
    candidates: Vec<PathBuf>,
    entries: RwLock<HashMap<String, String>>,
    source: RwLock<Option<PathBuf>>,
}

impl JsonFileDirectory {
    /// Open a directory from a single file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = load_file(&path)?;
        info!(path = %path.display(), count = entries.len(), "Loaded corp list");
        Ok(Self {
            candidates: vec![path.clone()],
            entries: RwLock::new(entries),
            source: RwLock::new(Some(path)),
        })
    }

    /// Create a directory from candidate paths, loading the first readable one.
    ///
    /// A directory with no readable candidate starts empty; lookups then miss until a
    /// reload finds a file.
    #[must_use]
    pub fn with_candidates<I, P>(candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let candidates: Vec<PathBuf> = candidates.into_iter().map(Into::into).collect();
        let (source, entries) = match load_first(&candidates) {
            Some((path, entries)) => (Some(path), entries),
            None => {
                warn!(?candidates, "No readable corp list found");
                (None, HashMap::new())
            }
        };
        Self {
            candidates,
            entries: RwLock::new(entries),
            source: RwLock::new(source),
        }
    }

    /// Returns the path the current entries were loaded from.
    #[must_use]
    pub fn source(&self) -> Option<PathBuf> {
        self.source.read().ok().and_then(|s| s.clone())
    }

    /// Returns the number of loaded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true if no entries are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn load_file(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)?;
    parse_corp_list(&content)
}

fn load_first(candidates: &[PathBuf]) -> Option<(PathBuf, HashMap<String, String>)> {
    for path in candidates {
        if !path.exists() {
            continue;
        }
        match load_file(path) {
            Ok(entries) => {
                info!(path = %path.display(), count = entries.len(), "Loaded corp list");
                return Some((path.clone(), entries));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load corp list");
            }
        }
    }
    None
}

impl EntityDirectory for JsonFileDirectory {
    fn name(&self) -> &str {
        "corp_list.json"
    }

    #[instrument(skip(self))]
    fn lookup(&self, entity_code: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| FilingError::Directory(e.to_string()))?;
        let name = entries.get(&normalize_corp_code(entity_code)).cloned();
        debug!(hit = name.is_some(), "Corp list lookup");
        Ok(name)
    }

    #[instrument(skip(self))]
    fn reload(&self) -> Result<()> {
        let (path, entries) = load_first(&self.candidates).ok_or_else(|| {
            FilingError::Directory(format!(
                "No readable corp list among {} candidate paths",
                self.candidates.len()
            ))
        })?;

        *self
            .entries
            .write()
            .map_err(|e| FilingError::Directory(e.to_string()))? = entries;
        *self
            .source
            .write()
            .map_err(|e| FilingError::Directory(e.to_string()))? = Some(path);
        Ok(())
    }
}
