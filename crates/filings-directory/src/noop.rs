//! No-op directory implementation.

use filings_core::{EntityDirectory, Result};
use tracing::trace;

/// A directory that knows no companies.
///
/// Every lookup returns `Ok(None)`, so every filing gets the `Corp_{code}` placeholder.
/// Useful when names are resolved later in the warehouse.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDirectory;

impl NoopDirectory {
    /// Create a new no-op directory.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EntityDirectory for NoopDirectory {
    fn name(&self) -> &str {
        "noop"
    }

    fn lookup(&self, _entity_code: &str) -> Result<Option<String>> {
        trace!("NoopDirectory: lookup called, returning None");
        Ok(None)
    }

    fn reload(&self) -> Result<()> {
        trace!("NoopDirectory: reload called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_directory() {
        let directory = NoopDirectory::new();
        assert_eq!(directory.lookup("00171636").unwrap(), None);
        directory.reload().unwrap();
        assert_eq!(directory.lookup("00171636").unwrap(), None);
    }
}
