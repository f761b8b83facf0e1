//! The fetch → extract → summarize pipeline behind `run` and its single-step
//! commands.

use super::ui;
use crate::core::extract::PriceExtractor;
use crate::core::html::Document;
use crate::core::page::PageSource;
use crate::core::valuation::{ValuationEngine, ValuationSummary};
use crate::store::{HoldingsStore, PriceHistoryStore, SummaryLedger};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Fetches the page and saves it to `page_path`, returning the HTML.
pub async fn fetch(source: &dyn PageSource, page_path: &Path) -> Result<String> {
    let pb = ui::new_spinner("Fetching price page...");
    let result = source.fetch_page().await;
    pb.finish_and_clear();
    let html = result?;

    if let Some(parent) = page_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(page_path, &html)
        .with_context(|| format!("Failed to save page to {}", page_path.display()))?;
    info!("Saved page HTML to {}", page_path.display());
    Ok(html)
}

/// Extracts prices from `html` and appends them to the history. Finding no
/// prices is not an error: nothing is written and 0 is returned.
pub fn extract(
    html: &str,
    extractor: &PriceExtractor,
    history: &PriceHistoryStore,
) -> Result<usize> {
    let doc = Document::parse(html);
    let records = extractor.extract_now(&doc);
    if records.is_empty() {
        warn!("No prices extracted from page; price history left unchanged");
        return Ok(0);
    }
    let count = history.append(&records)?;
    info!("{} records saved to {}", count, history.path().display());
    Ok(count)
}

/// Values the holdings at the latest snapshot and appends the result to the
/// summary ledger. Any valuation error leaves the ledger untouched.
pub fn summarize(
    history: &PriceHistoryStore,
    holdings: &HoldingsStore,
    engine: &ValuationEngine,
    ledger: &SummaryLedger,
) -> Result<ValuationSummary> {
    let snapshot = history.latest_snapshot()?.with_context(|| {
        format!(
            "Price history has no usable records: {}",
            history.path().display()
        )
    })?;
    let holdings = holdings.load()?;

    let summary = engine.compute(&holdings, &snapshot)?;
    ledger.append(&summary)?;
    print_summary(&summary);
    Ok(summary)
}

fn print_summary(summary: &ValuationSummary) {
    println!(
        "[{}] New record added:",
        ui::style_text(
            &summary.timestamp.to_string(),
            ui::StyleType::TotalLabel
        )
    );
    println!(
        "  • total_local   = {} (incl. cash)",
        ui::style_text(
            &ui::format_amount(summary.total_local.into(), 0),
            ui::StyleType::TotalValue
        )
    );
    println!(
        "  • total_foreign = {}",
        ui::style_text(
            &ui::format_amount(summary.total_foreign, 2),
            ui::StyleType::TotalValue
        )
    );
    println!(
        "  • cash_local    = {}",
        ui::format_amount(summary.cash_local, 0)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;
    use crate::core::valuation::ValuationError;
    use crate::providers::FilePageSource;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    const PAGE: &str = r#"
        <table>
          <tr><td>دلار آمریکا</td><td>58,100</td><td>58,300</td></tr>
        </table>
        <table>
          <tr><td>تمام امامی</td><td>71,000,000</td><td>71,500,000</td></tr>
          <tr><td>نیم بهار آزادی</td><td>38,000,000</td><td>38,200,000</td></tr>
        </table>"#;

    struct Fixture {
        _dir: TempDir,
        history: PriceHistoryStore,
        holdings: HoldingsStore,
        ledger: SummaryLedger,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        Fixture {
            history: PriceHistoryStore::new(dir.path().join("prices_history.csv")),
            holdings: HoldingsStore::new(dir.path().join("user_assets.json")),
            ledger: SummaryLedger::new(dir.path().join("portfolio_summary.json")),
            _dir: dir,
        }
    }

    #[test]
    fn test_extract_then_summarize() -> Result<()> {
        let f = fixture();
        let config = AppConfig::default();

        let count = extract(PAGE, &PriceExtractor::from_config(&config), &f.history)?;
        // the dollar row has no space before its label, so " دلار آمریکا" finds
        // its table but no row; only the coin rows match
        assert_eq!(count, 2);

        let extractor = PriceExtractor::new(
            vec!["دلار آمریکا".to_string()],
            Default::default(),
        );
        // a separate run gets its own (later or equal) timestamp
        extract(PAGE, &extractor, &f.history)?;

        f.holdings.set("دلار آمریکا", dec!(0))?;
        f.holdings.set("ریال", dec!(1000000))?;
        let summary = summarize(
            &f.history,
            &f.holdings,
            &ValuationEngine::from_config(&config),
            &f.ledger,
        )?;
        assert_eq!(summary.total_local, 1_000_000);
        assert_eq!(summary.total_foreign, dec!(14.64));
        assert_eq!(f.ledger.load()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_empty_extraction_writes_nothing() -> Result<()> {
        let f = fixture();
        let extractor = PriceExtractor::from_config(&AppConfig::default());
        assert_eq!(extract("<html></html>", &extractor, &f.history)?, 0);
        assert!(!f.history.path().exists());
        Ok(())
    }

    #[test]
    fn test_missing_price_leaves_ledger_untouched() -> Result<()> {
        let f = fixture();
        let config = AppConfig::default();
        extract(PAGE, &PriceExtractor::from_config(&config), &f.history)?;
        f.holdings.set("ربع بهار آزادی", dec!(2))?;

        let err = summarize(
            &f.history,
            &f.holdings,
            &ValuationEngine::from_config(&config),
            &f.ledger,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValuationError>(),
            Some(ValuationError::MissingPrice { subject, .. }) if subject == "ربع بهار آزادی"
        ));
        assert!(!f.ledger.path().exists());
        Ok(())
    }

    #[test]
    fn test_missing_reference_rate_leaves_ledger_untouched() -> Result<()> {
        let f = fixture();
        let config = AppConfig::default();
        // only the coin rows match, so the snapshot has no dollar rate
        extract(PAGE, &PriceExtractor::from_config(&config), &f.history)?;
        f.holdings.set("نیم بهار آزادی", dec!(1))?;

        let err = summarize(
            &f.history,
            &f.holdings,
            &ValuationEngine::from_config(&config),
            &f.ledger,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValuationError>(),
            Some(ValuationError::MissingReferenceRate { subject, .. }) if subject == "دلار آمریکا"
        ));
        assert!(!f.ledger.path().exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_saves_page() -> Result<()> {
        let dir = TempDir::new()?;
        let source_path = dir.path().join("source.html");
        std::fs::write(&source_path, PAGE)?;
        let page_path = dir.path().join("data").join("page.html");

        let html = fetch(&FilePageSource::new(&source_path), &page_path).await?;
        assert_eq!(html, PAGE);
        assert_eq!(std::fs::read_to_string(&page_path)?, PAGE);
        Ok(())
    }
}
