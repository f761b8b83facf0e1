//! Holdings kept as a flat JSON object of subject → quantity.

use crate::core::valuation::Holdings;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct HoldingsStore {
    path: PathBuf,
}

impl HoldingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Holdings> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read holdings file: {}", self.path.display()))?;
        let holdings: Holdings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse holdings file: {}", self.path.display()))?;
        debug!(count = holdings.len(), "Loaded holdings");
        Ok(holdings)
    }

    pub fn save(&self, holdings: &Holdings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(holdings)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write holdings file: {}", self.path.display()))
    }

    /// Creates the file with every subject at zero. An existing file is kept
    /// as is; returns whether a file was created.
    pub fn init<'a>(&self, subjects: impl IntoIterator<Item = &'a str>) -> Result<bool> {
        if self.path.exists() {
            debug!(path = %self.path.display(), "Holdings file already exists");
            return Ok(false);
        }
        let holdings: Holdings = subjects
            .into_iter()
            .map(|s| (s.to_string(), Decimal::ZERO))
            .collect();
        self.save(&holdings)?;
        info!("Created holdings file at {}", self.path.display());
        Ok(true)
    }

    /// Sets one quantity and rewrites the file.
    pub fn set(&self, subject: &str, quantity: Decimal) -> Result<Holdings> {
        if quantity.is_sign_negative() {
            anyhow::bail!("Quantity for '{subject}' must not be negative, got {quantity}");
        }
        let mut holdings = if self.path.exists() {
            self.load()?
        } else {
            Holdings::new()
        };
        holdings.insert(subject.to_string(), quantity);
        self.save(&holdings)?;
        Ok(holdings)
    }
}
