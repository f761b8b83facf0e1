//! Price records and the latest-price snapshot

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

/// Timestamp layout used by the price history and the summary ledger.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One extracted quote for a subject.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub subject: String,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub timestamp: NaiveDateTime,
}

/// Sell prices of every subject quoted at the most recent timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub timestamp: NaiveDateTime,
    pub prices: HashMap<String, Decimal>,
}

impl Snapshot {
    pub fn price(&self, subject: &str) -> Option<Decimal> {
        self.prices.get(subject).copied()
    }
}

/// Parses a price cell: thousands separators are dropped and Persian or
/// Arabic-Indic digits are read as ASCII. Negative or empty values are rejected.
pub fn parse_price(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '٬' | '"') && !c.is_whitespace())
        .map(|c| match c {
            '۰'..='۹' => char::from(b'0' + (c as u32 - '۰' as u32) as u8),
            '٠'..='٩' => char::from(b'0' + (c as u32 - '٠' as u32) as u8),
            '٫' => '.',
            _ => c,
        })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .ok()
        .filter(|price| !price.is_sign_negative())
}

pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

pub(crate) mod timestamp {
    use super::{TIMESTAMP_FORMAT, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse_timestamp(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {text}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_price_strips_separators() {
        assert_eq!(parse_price("1,234,500"), Some(dec!(1234500)));
        assert_eq!(parse_price("  98,000 "), Some(dec!(98000)));
        assert_eq!(parse_price("\"1,000\""), Some(dec!(1000)));
        assert_eq!(parse_price("12.5"), Some(dec!(12.5)));
    }

    #[test]
    fn test_parse_price_reads_persian_digits() {
        assert_eq!(parse_price("۱۲۳٬۴۵۶"), Some(dec!(123456)));
        assert_eq!(parse_price("٩٨٧"), Some(dec!(987)));
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("-"), None);
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price("-5"), None);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected =
            NaiveDateTime::parse_from_str("2025-07-24 10:30:00", TIMESTAMP_FORMAT).unwrap();
        assert_eq!(parse_timestamp("2025-07-24 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-07-24T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("24/07/2025"), None);
    }
}
