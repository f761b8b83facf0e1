use crate::core::config::SourceConfig;
use crate::core::page::PageSource;
use crate::providers::util::with_retry;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, instrument};

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) pricefolio/0.1";

/// Fetches the price page over plain HTTP.
pub struct HttpPageSource {
    url: String,
    retries: usize,
    retry_delay_ms: u64,
}

impl HttpPageSource {
    pub fn new(url: &str, retries: usize, retry_delay_ms: u64) -> Self {
        HttpPageSource {
            url: url.to_string(),
            retries,
            retry_delay_ms,
        }
    }

    pub fn from_config(source: &SourceConfig) -> Result<Self> {
        let url = source
            .url
            .as_deref()
            .ok_or_else(|| anyhow!("No source url configured"))?;
        Ok(Self::new(url, source.retries, source.retry_delay_ms))
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    #[instrument(name = "PageFetch", skip(self), fields(url = %self.url))]
    async fn fetch_page(&self) -> Result<String> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        debug!("Requesting price page");

        let body = with_retry(
            || async {
                client
                    .get(&self.url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await
            },
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .with_context(|| format!("Failed to fetch price page from {}", self.url))?;

        debug!(bytes = body.len(), "Received price page");
        Ok(body)
    }
}
