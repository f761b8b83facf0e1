use super::ui;
use crate::core::config::AppConfig;
use crate::core::price::PriceRecord;
use crate::core::valuation::{Holdings, ValuationSummary};
use crate::store::{HoldingsStore, PriceHistoryStore, SummaryLedger};
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};
use rust_decimal::Decimal;
use tracing::debug;

/// Everything the console report shows, gathered up front so rendering
/// stays free of I/O.
pub struct Report {
    pub latest: Option<ValuationSummary>,
    pub previous: Option<ValuationSummary>,
    pub holdings: Holdings,
    pub prices: Vec<PriceRecord>,
}

impl Report {
    /// Missing files produce empty sections rather than errors.
    pub fn load(
        ledger: &SummaryLedger,
        holdings: &HoldingsStore,
        history: &PriceHistoryStore,
    ) -> Result<Self> {
        let mut entries = ledger.load()?;
        let latest = entries.pop();
        let previous = entries.pop();

        let holdings = if holdings.path().exists() {
            holdings.load()?
        } else {
            debug!("No holdings file at {}", holdings.path().display());
            Holdings::new()
        };
        let prices = if history.path().exists() {
            history.latest_records()?
        } else {
            debug!("No price history at {}", history.path().display());
            Vec::new()
        };

        Ok(Report {
            latest,
            previous,
            holdings,
            prices,
        })
    }

    /// Percentage change of the local total since the previous ledger entry.
    pub fn total_change(&self) -> Option<Decimal> {
        let latest = Decimal::from(self.latest.as_ref()?.total_local);
        let previous = Decimal::from(self.previous.as_ref()?.total_local);
        if previous.is_zero() {
            return None;
        }
        Some((latest - previous) / previous * Decimal::ONE_HUNDRED)
    }

    pub fn render(&self, config: &AppConfig) -> String {
        let mut output = format!(
            "{}\n\n",
            ui::style_text("Your financial report", ui::StyleType::Title)
        );

        match &self.latest {
            Some(summary) => {
                let mut table = ui::new_styled_table();
                table.set_header(vec![ui::header_cell("Total"), ui::header_cell("Value")]);
                table.add_row(vec![
                    Cell::new("Total assets (local)"),
                    ui::amount_cell(summary.total_local.into(), 0),
                ]);
                table.add_row(vec![
                    Cell::new("Total assets (foreign)"),
                    ui::amount_cell(summary.total_foreign, 2),
                ]);
                table.add_row(vec![
                    Cell::new("Cash (local)"),
                    ui::amount_cell(summary.cash_local, 0),
                ]);
                if let Some(change) = self.total_change() {
                    table.add_row(vec![
                        Cell::new("Change since last run"),
                        ui::change_cell(change),
                    ]);
                }
                output.push_str(&format!(
                    "As of {}\n",
                    ui::style_text(&summary.timestamp.to_string(), ui::StyleType::Subtle)
                ));
                output.push_str(&table.to_string());
            }
            None => output.push_str(&ui::style_text(
                "No portfolio summary recorded yet",
                ui::StyleType::Error,
            )),
        }

        output.push_str(&format!(
            "\n\n{}\n",
            ui::style_text("Your assets", ui::StyleType::TotalLabel)
        ));
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Asset"), ui::header_cell("Quantity")]);
        for (subject, quantity) in &self.holdings {
            table.add_row(vec![
                Cell::new(config.display_name(subject)),
                Cell::new(quantity.normalize()).set_alignment(CellAlignment::Right),
            ]);
        }
        output.push_str(&table.to_string());

        output.push_str(&format!(
            "\n\n{}\n",
            ui::style_text("Latest prices", ui::StyleType::TotalLabel)
        ));
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Asset"),
            ui::header_cell("Buy"),
            ui::header_cell("Sell"),
        ]);
        for record in &self.prices {
            table.add_row(vec![
                Cell::new(config.display_name(&record.subject)),
                ui::amount_cell(record.buy_price, 0),
                ui::amount_cell(record.sell_price, 0),
            ]);
        }
        output.push_str(&table.to_string());

        output
    }
}

pub fn run(
    config: &AppConfig,
    ledger: &SummaryLedger,
    holdings: &HoldingsStore,
    history: &PriceHistoryStore,
) -> Result<()> {
    let report = Report::load(ledger, holdings, history)?;
    println!("{}", report.render(config));
    Ok(())
}
