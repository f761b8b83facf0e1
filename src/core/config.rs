use anyhow::{Context, Result};
use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const PAGE_FILE: &str = "page.html";
pub const PRICE_HISTORY_FILE: &str = "prices_history.csv";
pub const HOLDINGS_FILE: &str = "user_assets.json";
pub const SUMMARY_FILE: &str = "portfolio_summary.json";

/// Where the price page comes from.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourceConfig {
    pub url: Option<String>,
    #[serde(default = "default_retries")]
    pub retries: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_retries() -> usize {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            url: None,
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// A tracked subject: the canonical label on the price page, a short key for
/// editing holdings and an optional display name for reports.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SubjectConfig {
    pub name: String,
    pub key: String,
    pub display: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default = "default_targets")]
    pub targets: Vec<String>,
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,
    #[serde(default = "default_subjects")]
    pub subjects: Vec<SubjectConfig>,
    #[serde(default = "default_cash_subject")]
    pub cash_subject: String,
    #[serde(default = "default_reference_subject")]
    pub reference_subject: String,
    #[serde(default = "default_fixed_spread")]
    pub fixed_spread: Decimal,
    pub data_path: Option<String>,
}

fn default_targets() -> Vec<String> {
    [" دلار آمریکا", "تمام امامی", "تمام بهار", "نیم بهار", "ربع بهار"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

fn default_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("تمام امامی".to_string(), "تمام امامی(86)".to_string()),
        ("تمام امامی (86)".to_string(), "تمام امامی(86)".to_string()),
    ])
}

fn default_subjects() -> Vec<SubjectConfig> {
    [
        ("دلار آمریکا", "usd", "US Dollar"),
        ("تمام امامی(86)", "emami", "Imami Gold Coin (2007)"),
        ("تمام بهار آزادی", "bahar", "Full Bahar Azadi Coin"),
        ("نیم بهار آزادی", "half", "Half Bahar Azadi Coin"),
        ("ربع بهار آزادی", "quarter", "Quarter Bahar Azadi Coin"),
        ("ریال", "rial", "Iranian Rial"),
    ]
    .iter()
    .map(|(name, key, display)| SubjectConfig {
        name: name.to_string(),
        key: key.to_string(),
        display: Some(display.to_string()),
    })
    .collect()
}

fn default_cash_subject() -> String {
    "ریال".to_string()
}

fn default_reference_subject() -> String {
    "دلار آمریکا".to_string()
}

fn default_fixed_spread() -> Decimal {
    Decimal::from(10_000)
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source: SourceConfig::default(),
            targets: default_targets(),
            aliases: default_aliases(),
            subjects: default_subjects(),
            cash_subject: default_cash_subject(),
            reference_subject: default_reference_subject(),
            fixed_spread: default_fixed_spread(),
            data_path: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "pricefolio", "pricefolio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "pricefolio", "pricefolio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn page_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(PAGE_FILE))
    }

    pub fn price_history_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(PRICE_HISTORY_FILE))
    }

    pub fn holdings_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(HOLDINGS_FILE))
    }

    pub fn summary_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(SUMMARY_FILE))
    }

    /// Resolves a short key (`usd`) or a subject name to the subject name.
    pub fn resolve_subject(&self, key_or_name: &str) -> Option<&str> {
        self.subjects
            .iter()
            .find(|s| s.key.eq_ignore_ascii_case(key_or_name) || s.name == key_or_name)
            .map(|s| s.name.as_str())
    }

    /// English display name for a subject, falling back to the subject itself.
    pub fn display_name<'a>(&'a self, subject: &'a str) -> &'a str {
        self.subjects
            .iter()
            .find(|s| s.name == subject)
            .and_then(|s| s.display.as_deref())
            .unwrap_or(subject)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.fixed_spread.is_sign_negative() {
            anyhow::bail!("fixed_spread must not be negative, got {}", self.fixed_spread);
        }
        if self.targets.iter().any(|t| t.trim().is_empty()) {
            anyhow::bail!("targets must not contain blank labels");
        }
        Ok(())
    }
}
