//! Append-only ledger of valuation summaries, stored as one JSON array.

use crate::core::valuation::ValuationSummary;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct SummaryLedger {
    path: PathBuf,
}

impl SummaryLedger {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All summaries in insertion order. A missing or empty file is an empty ledger.
    pub fn load(&self) -> Result<Vec<ValuationSummary>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read summary ledger: {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse summary ledger: {}", self.path.display()))
    }

    /// Appends one entry and rewrites the whole ledger.
    pub fn append(&self, summary: &ValuationSummary) -> Result<usize> {
        let mut entries = self.load()?;
        entries.push(summary.clone());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write summary ledger: {}", self.path.display()))?;
        debug!(entries = entries.len(), "Appended summary");
        Ok(entries.len())
    }
}
