pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::extract::PriceExtractor;
use crate::core::page::PageSource;
use crate::core::valuation::ValuationEngine;
use crate::providers::{FilePageSource, HttpPageSource};
use crate::store::{HoldingsStore, PriceHistoryStore, SummaryLedger};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Fetch,
    Extract,
    Summarize,
    Run,
    Report,
    Holdings(HoldingsCommand),
}

pub enum HoldingsCommand {
    Init,
    Show,
    Set { subject: String, quantity: Decimal },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("pricefolio starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let history = PriceHistoryStore::new(config.price_history_path()?);
    let holdings = HoldingsStore::new(config.holdings_path()?);
    let ledger = SummaryLedger::new(config.summary_path()?);

    match command {
        AppCommand::Fetch => {
            let source = HttpPageSource::from_config(&config.source)?;
            cli::pipeline::fetch(&source, &config.page_path()?).await?;
        }
        AppCommand::Extract => {
            let page_path = config.page_path()?;
            let html = std::fs::read_to_string(&page_path).with_context(|| {
                format!(
                    "Failed to read saved page {}; run `fetch` first",
                    page_path.display()
                )
            })?;
            cli::pipeline::extract(&html, &PriceExtractor::from_config(&config), &history)?;
        }
        AppCommand::Summarize => {
            cli::pipeline::summarize(
                &history,
                &holdings,
                &ValuationEngine::from_config(&config),
                &ledger,
            )?;
        }
        AppCommand::Run => {
            let source = page_source(&config)?;
            let html = cli::pipeline::fetch(source.as_ref(), &config.page_path()?).await?;
            cli::pipeline::extract(&html, &PriceExtractor::from_config(&config), &history)?;
            cli::pipeline::summarize(
                &history,
                &holdings,
                &ValuationEngine::from_config(&config),
                &ledger,
            )?;
        }
        AppCommand::Report => cli::report::run(&config, &ledger, &holdings, &history)?,
        AppCommand::Holdings(HoldingsCommand::Init) => cli::holdings::init(&config, &holdings)?,
        AppCommand::Holdings(HoldingsCommand::Show) => cli::holdings::show(&config, &holdings)?,
        AppCommand::Holdings(HoldingsCommand::Set { subject, quantity }) => {
            cli::holdings::set(&config, &holdings, &subject, quantity)?
        }
    }
    Ok(())
}

/// The configured URL, or the previously saved page when none is set.
fn page_source(config: &AppConfig) -> Result<Box<dyn PageSource>> {
    if config.source.url.is_some() {
        return Ok(Box::new(HttpPageSource::from_config(&config.source)?));
    }
    let page_path = config.page_path()?;
    warn!(
        "No source url configured; re-reading saved page {}",
        page_path.display()
    );
    Ok(Box::new(FilePageSource::new(page_path)))
}
