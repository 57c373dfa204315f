use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::error::{KeywardError, KeywardResult};

use super::{ImportOutcome, KeyAgent, KeyringImportSink};

/// Import sink that records everything it receives
#[derive(Debug, Default)]
pub struct MemoryKeyringSink {
    imported: RefCell<Vec<String>>,
    fail_with: Option<String>,
}

impl MemoryKeyringSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every import with the given diagnostics
    pub fn failing(diagnostics: impl Into<String>) -> Self {
        Self {
            imported: RefCell::default(),
            fail_with: Some(diagnostics.into()),
        }
    }

    pub fn imported(&self) -> Vec<String> {
        self.imported.borrow().clone()
    }
}

impl KeyringImportSink for MemoryKeyringSink {
    fn import(&self, armored: &str) -> ImportOutcome {
        if let Some(diagnostics) = &self.fail_with {
            return ImportOutcome::failed(diagnostics.clone());
        }
        self.imported.borrow_mut().push(armored.to_string());
        ImportOutcome::ok("imported")
    }
}

/// Key agent that records loaded key paths
#[derive(Debug, Default)]
pub struct MemoryKeyAgent {
    loaded: RefCell<Vec<PathBuf>>,
    reject: bool,
}

impl MemoryKeyAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// An agent that refuses every key
    pub fn rejecting() -> Self {
        Self {
            loaded: RefCell::default(),
            reject: true,
        }
    }

    pub fn loaded(&self) -> Vec<PathBuf> {
        self.loaded.borrow().clone()
    }
}

impl KeyAgent for MemoryKeyAgent {
    fn add_key(&self, private_key: &Path) -> KeywardResult<()> {
        if self.reject {
            return Err(KeywardError::Agent(format!(
                "agent refused {}",
                private_key.display()
            )));
        }
        self.loaded.borrow_mut().push(private_key.to_path_buf());
        Ok(())
    }
}
