use super::ui;
use crate::core::config::AppConfig;
use crate::core::valuation::Holdings;
use crate::store::HoldingsStore;
use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment};
use rust_decimal::Decimal;

/// Creates the holdings file with every configured subject at zero.
pub fn init(config: &AppConfig, store: &HoldingsStore) -> Result<()> {
    let created = store.init(config.subjects.iter().map(|s| s.name.as_str()))?;
    if created {
        println!("Created holdings file at {}", store.path().display());
    } else {
        println!(
            "{}",
            ui::style_text(
                &format!("Holdings file already exists at {}", store.path().display()),
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}

pub fn show(config: &AppConfig, store: &HoldingsStore) -> Result<()> {
    let holdings = store.load()?;
    println!("{}", render(config, &holdings));
    Ok(())
}

/// Sets the quantity of the subject named by `key_or_name`. Only configured
/// subjects are accepted so typos never reach the holdings file.
pub fn set(
    config: &AppConfig,
    store: &HoldingsStore,
    key_or_name: &str,
    quantity: Decimal,
) -> Result<()> {
    let subject = config
        .resolve_subject(key_or_name)
        .with_context(|| format!("Unknown subject '{key_or_name}'"))?;
    store.set(subject, quantity)?;
    println!(
        "{} = {}",
        config.display_name(subject),
        ui::style_text(&quantity.normalize().to_string(), ui::StyleType::TotalValue)
    );
    Ok(())
}

fn render(config: &AppConfig, holdings: &Holdings) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Key"),
        ui::header_cell("Asset"),
        ui::header_cell("Quantity"),
    ]);
    for (subject, quantity) in holdings {
        let key = config
            .subjects
            .iter()
            .find(|s| &s.name == subject)
            .map_or("-", |s| s.key.as_str());
        table.add_row(vec![
            Cell::new(key),
            Cell::new(config.display_name(subject)),
            Cell::new(quantity.normalize()).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}
