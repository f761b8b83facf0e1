//! Price extraction from the scraped page.
//!
//! Matching is plain substring search over table and row text, and only the
//! first matching table (and the first qualifying row inside it) is used per
//! target. This is brittle by nature and tied to the current page layout:
//! decoy tables that repeat a label further down the page are ignored, and
//! historical price data depends on that. Switching to a "most specific" match
//! would be a behavior change.

use crate::core::config::AppConfig;
use crate::core::html::{Document, Row};
use crate::core::label::LabelNormalizer;
use crate::core::price::{PriceRecord, parse_price};
use chrono::{Local, NaiveDateTime, SubsecRound};
use tracing::{debug, instrument};

/// Minimum number of `td` cells in a price row: label, buy, sell.
const MIN_CELLS: usize = 3;

#[derive(Debug, Clone)]
pub struct PriceExtractor {
    targets: Vec<String>,
    normalizer: LabelNormalizer,
}

impl PriceExtractor {
    pub fn new(targets: Vec<String>, normalizer: LabelNormalizer) -> Self {
        Self {
            targets,
            normalizer,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let normalizer = LabelNormalizer::new(
            &config.aliases,
            config.subjects.iter().map(|s| s.name.as_str()),
        );
        Self::new(config.targets.clone(), normalizer)
    }

    /// Extracts using the current wall-clock time, truncated to seconds.
    pub fn extract_now(&self, doc: &Document) -> Vec<PriceRecord> {
        self.extract(doc, Local::now().naive_local().trunc_subsecs(0))
    }

    /// Returns one record per target found, in target order. Every record of
    /// a run carries the same `timestamp`.
    #[instrument(skip_all, fields(targets = self.targets.len()))]
    pub fn extract(&self, doc: &Document, timestamp: NaiveDateTime) -> Vec<PriceRecord> {
        let mut records = Vec::new();
        for target in &self.targets {
            let Some(row) = find_row(doc, target) else {
                debug!(target = %target, "No price row found");
                continue;
            };
            match self.to_record(row, timestamp) {
                Some(record) => {
                    debug!(subject = %record.subject, sell = %record.sell_price, "Extracted price");
                    records.push(record);
                }
                None => {
                    debug!(target = %target, cells = ?row.cells, "Skipping unparseable price row")
                }
            }
        }
        records
    }

    fn to_record(&self, row: &Row, timestamp: NaiveDateTime) -> Option<PriceRecord> {
        let subject = self.normalizer.normalize(&row.cells[0]);
        if !self.normalizer.is_tracked(&subject) {
            debug!(subject = %subject, "Extracted label is not a tracked subject");
        }
        Some(PriceRecord {
            subject,
            buy_price: parse_price(&row.cells[1])?,
            sell_price: parse_price(&row.cells[2])?,
            timestamp,
        })
    }
}

/// First table containing `target`, then its first row containing `target`
/// with enough cells. No fallback to later tables.
fn find_row<'a>(doc: &'a Document, target: &str) -> Option<&'a Row> {
    let table = doc.tables().iter().find(|t| t.text.contains(target))?;
    table
        .rows()
        .iter()
        .find(|row| row.text.contains(target) && row.cells.len() >= MIN_CELLS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn ts() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2025-07-24 10:30:00", crate::core::price::TIMESTAMP_FORMAT)
            .unwrap()
    }

    fn extractor(targets: &[&str]) -> PriceExtractor {
        let aliases = BTreeMap::from([("Emami".to_string(), "Emami(86)".to_string())]);
        PriceExtractor::new(
            targets.iter().map(|t| t.to_string()).collect(),
            LabelNormalizer::new(&aliases, ["US Dollar", "Emami(86)", "Half Coin"]),
        )
    }

    const PAGE: &str = r#"
        <table id="currency">
          <tr><th>Currency</th><th>Buy</th><th>Sell</th></tr>
          <tr><td>&nbsp;US Dollar </td><td>58,100</td><td>58,300</td></tr>
          <tr><td>Euro</td><td>63,000</td><td>63,400</td></tr>
        </table>
        <table id="coins">
          <tr><td>Emami</td><td>71,000,000</td><td>71,500,000</td></tr>
          <tr><td>Half Coin</td><td>38,000,000</td><td>38,200,000</td></tr>
        </table>"#;

    #[test]
    fn test_extracts_one_record_per_target_in_target_order() {
        let doc = Document::parse(PAGE);
        let records = extractor(&["Half Coin", "US Dollar", "Emami"]).extract(&doc, ts());

        let subjects: Vec<&str> = records.iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(subjects, vec!["Half Coin", "US Dollar", "Emami(86)"]);
        assert_eq!(records[1].buy_price, dec!(58100));
        assert_eq!(records[1].sell_price, dec!(58300));
        assert_eq!(records[2].sell_price, dec!(71500000));
        assert!(records.iter().all(|r| r.timestamp == ts()));
    }

    #[test]
    fn test_no_matching_tables_yields_nothing() {
        let doc = Document::parse("<html><body><p>maintenance</p></body></html>");
        assert!(extractor(&["US Dollar"]).extract(&doc, ts()).is_empty());
    }

    #[test]
    fn test_uses_first_matching_table_only() {
        let html = r#"
            <table><tr><td>Gold</td><td>1</td><td>2</td></tr></table>
            <table><tr><td>Gold</td><td>10</td><td>20</td></tr></table>"#;
        let records = extractor(&["Gold"]).extract(&Document::parse(html), ts());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sell_price, dec!(2));
    }

    #[test]
    fn test_first_table_without_qualifying_row_yields_nothing() {
        // the label appears in a caption-like row with too few cells; the later
        // table is not consulted
        let html = r#"
            <table><tr><td>Gold prices today</td></tr></table>
            <table><tr><td>Gold</td><td>10</td><td>20</td></tr></table>"#;
        assert!(extractor(&["Gold"]).extract(&Document::parse(html), ts()).is_empty());
    }

    #[test]
    fn test_skips_short_rows_within_table() {
        let html = r#"
            <table>
              <tr><td colspan="3">Gold</td></tr>
              <tr><td>Gold</td><td>10</td><td>20</td></tr>
            </table>"#;
        let records = extractor(&["Gold"]).extract(&Document::parse(html), ts());
        assert_eq!(records[0].buy_price, dec!(10));
    }

    #[test]
    fn test_unparseable_row_is_skipped_not_fatal() {
        let html = r#"
            <table>
              <tr><td>US Dollar</td><td>--</td><td>58,300</td></tr>
              <tr><td>Half Coin</td><td>38,000,000</td><td>38,200,000</td></tr>
            </table>"#;
        let records = extractor(&["US Dollar", "Half Coin"]).extract(&Document::parse(html), ts());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject, "Half Coin");
    }

    #[test]
    fn test_overlapping_targets_may_emit_duplicates() {
        let doc = Document::parse(PAGE);
        let records = extractor(&["Half", "Half Coin"]).extract(&doc, ts());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].subject, records[1].subject);
    }

    #[test]
    fn test_angle_bracket_in_attribute_keeps_label_intact() {
        let html = r#"<table><tr><td data-rule="a>b">US Dollar</td><td>58,100</td><td>58,300</td></tr></table>"#;
        let records = extractor(&["US Dollar"]).extract(&Document::parse(html), ts());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject, "US Dollar");
        assert_eq!(records[0].sell_price, dec!(58300));
    }

    #[test]
    fn test_from_config_uses_default_aliases() {
        let html = "<table><tr><td>تمام امامی</td><td>70,000</td><td>71,000</td></tr></table>";
        let records = PriceExtractor::from_config(&AppConfig::default())
            .extract(&Document::parse(html), ts());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject, "تمام امامی(86)");
    }
}
