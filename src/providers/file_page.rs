use crate::core::page::PageSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads a page saved earlier by `fetch` (or by any other tool).
pub struct FilePageSource {
    path: PathBuf,
}

impl FilePageSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FilePageSource {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl PageSource for FilePageSource {
    async fn fetch_page(&self) -> Result<String> {
        debug!("Reading price page from {}", self.path.display());
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read page file: {}", self.path.display()))
    }
}
