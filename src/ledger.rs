use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk shape of the ledger: `{ "commits": [ ... ] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFile {
    /// Canonical timestamp text of every generated commit, in generation order
    #[serde(default)]
    pub commits: Vec<String>,

    /// Single-entry `{ "date": ... }` shape written by older releases
    #[serde(default, skip_serializing)]
    date: Option<String>,
}

impl LedgerFile {
    fn normalize(mut self) -> Self {
        if let Some(date) = self.date.take() {
            self.commits.push(date);
        }
        self
    }
}

/// Append-only JSON record of generated commit timestamps
///
/// Every read goes back to disk; the struct only remembers where the file is.
/// Persistence is at-most-once: a crash between read and write loses the
/// in-flight entry, so the repository log stays authoritative.
#[derive(Debug, Clone)]
pub struct CommitLedger {
    path: PathBuf,
}

impl CommitLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ledger file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty ledger (and its parent directories) if none exists
    pub fn ensure_initialized(&self) -> Result<(), LedgerError> {
        if self.path.exists() {
            tracing::debug!("Ledger already present at {}", self.path.display());
            return Ok(());
        }

        let init_error = |reason: String| LedgerError::InitFailed {
            path: self.path.display().to_string(),
            reason,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| init_error(format!("failed to create directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(&LedgerFile::default())
            .map_err(|e| init_error(e.to_string()))?;
        fs::write(&self.path, content + "\n").map_err(|e| init_error(e.to_string()))?;

        tracing::info!("Initialized empty ledger at {}", self.path.display());
        Ok(())
    }

    /// Read the ledger, treating a missing file as empty
    pub fn load(&self) -> Result<LedgerFile, LedgerError> {
        if !self.path.exists() {
            tracing::debug!("Ledger file not found, starting with empty ledger");
            return Ok(LedgerFile::default());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| self.read_error(format!("failed to read: {}", e)))?;
        let ledger: LedgerFile = serde_json::from_str(&content)
            .map_err(|e| self.read_error(format!("failed to parse: {}", e)))?;

        Ok(ledger.normalize())
    }

    /// Append one entry and write the whole ledger back; returns the new length
    pub fn append(&self, entry: &str) -> Result<usize, LedgerError> {
        let mut ledger = self.load().map_err(|e| self.write_error(e.to_string()))?;
        ledger.commits.push(entry.to_string());
        self.save(&ledger)?;

        tracing::debug!(
            "Appended {} to ledger ({} entries)",
            entry,
            ledger.commits.len()
        );
        Ok(ledger.commits.len())
    }

    /// Number of recorded entries
    pub fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.load()?.commits.len())
    }

    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }

    /// Most recently generated entry
    pub fn last(&self) -> Result<Option<String>, LedgerError> {
        Ok(self.load()?.commits.pop())
    }

    /// Drop entries past `len`
    ///
    /// Only the orchestrator calls this, to discard the entry of a commit that
    /// never made it into history.
    pub fn truncate(&self, len: usize) -> Result<(), LedgerError> {
        let mut ledger = self.load().map_err(|e| self.write_error(e.to_string()))?;
        if ledger.commits.len() <= len {
            return Ok(());
        }
        ledger.commits.truncate(len);
        self.save(&ledger)
    }

    fn save(&self, ledger: &LedgerFile) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| self.write_error(format!("failed to create directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(ledger)
            .map_err(|e| self.write_error(format!("failed to serialize: {}", e)))?;
        fs::write(&self.path, content + "\n")
            .map_err(|e| self.write_error(format!("failed to write: {}", e)))?;

        Ok(())
    }

    fn read_error(&self, reason: String) -> LedgerError {
        LedgerError::ReadFailed {
            path: self.path.display().to_string(),
            reason,
        }
    }

    fn write_error(&self, reason: String) -> LedgerError {
        LedgerError::WriteFailed {
            path: self.path.display().to_string(),
            reason,
        }
    }
}
