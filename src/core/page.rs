//! Page source abstraction

use anyhow::Result;
use async_trait::async_trait;

/// Supplies the raw HTML of the price page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self) -> Result<String>;
}
