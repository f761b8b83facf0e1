//! Portfolio valuation against the latest price snapshot.
use crate::core::config::AppConfig;
use crate::core::price::{Snapshot, timestamp};
use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Quantity held per subject, as stored in the holdings file.
pub type Holdings = BTreeMap<String, Decimal>;

/// Failures that abort a valuation run. A silent zero would put a false
/// total into the summary ledger, so none of these default.
#[derive(Debug, Error, PartialEq)]
pub enum ValuationError {
    #[error("No price for '{subject}' at {timestamp}")]
    MissingPrice {
        subject: String,
        timestamp: NaiveDateTime,
    },
    #[error("No reference rate '{subject}' at {timestamp}")]
    MissingReferenceRate {
        subject: String,
        timestamp: NaiveDateTime,
    },
    #[error("Reference rate for '{subject}' plus spread is zero at {timestamp}")]
    InvalidReferenceRate {
        subject: String,
        timestamp: NaiveDateTime,
    },
    #[error("Portfolio total is out of range at {timestamp}")]
    TotalOutOfRange { timestamp: NaiveDateTime },
}

/// One entry of the summary ledger. Field names on disk match the ledger
/// files written by earlier versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationSummary {
    #[serde(rename = "datetime", with = "timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "total_toman")]
    pub total_local: i64,
    #[serde(rename = "total_dollar")]
    pub total_foreign: Decimal,
    #[serde(rename = "cash_toman")]
    pub cash_local: Decimal,
}

#[derive(Debug, Clone)]
pub struct ValuationEngine {
    cash_subject: String,
    reference_subject: String,
    fixed_spread: Decimal,
}

impl ValuationEngine {
    pub fn new(cash_subject: &str, reference_subject: &str, fixed_spread: Decimal) -> Self {
        Self {
            cash_subject: cash_subject.to_string(),
            reference_subject: reference_subject.to_string(),
            fixed_spread,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.cash_subject,
            &config.reference_subject,
            config.fixed_spread,
        )
    }

    /// Values `holdings` at the snapshot's sell prices.
    ///
    /// The local total is truncated to an integer after adding cash; the
    /// foreign total divides it by the reference rate plus the fixed spread,
    /// rounded half-to-even at two places.
    pub fn compute(
        &self,
        holdings: &Holdings,
        snapshot: &Snapshot,
    ) -> Result<ValuationSummary, ValuationError> {
        let out_of_range = || ValuationError::TotalOutOfRange {
            timestamp: snapshot.timestamp,
        };

        let mut total_assets = Decimal::ZERO;
        for (subject, quantity) in holdings {
            if *subject == self.cash_subject {
                continue;
            }
            let price = snapshot
                .price(subject)
                .ok_or_else(|| ValuationError::MissingPrice {
                    subject: subject.clone(),
                    timestamp: snapshot.timestamp,
                })?;
            debug!(%subject, %quantity, %price, "Valuing holding");
            total_assets = quantity
                .checked_mul(price)
                .and_then(|value| total_assets.checked_add(value))
                .ok_or_else(out_of_range)?;
        }

        let cash_local = holdings
            .get(&self.cash_subject)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let total = total_assets
            .checked_add(cash_local)
            .ok_or_else(out_of_range)?
            .trunc();
        let total_local = total.to_i64().ok_or_else(out_of_range)?;

        let reference_price =
            snapshot
                .price(&self.reference_subject)
                .ok_or_else(|| ValuationError::MissingReferenceRate {
                    subject: self.reference_subject.clone(),
                    timestamp: snapshot.timestamp,
                })?;
        let divisor = reference_price
            .checked_add(self.fixed_spread)
            .ok_or_else(out_of_range)?;
        let total_foreign = total
            .checked_div(divisor)
            .ok_or_else(|| ValuationError::InvalidReferenceRate {
                subject: self.reference_subject.clone(),
                timestamp: snapshot.timestamp,
            })?
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);

        Ok(ValuationSummary {
            timestamp: snapshot.timestamp,
            total_local,
            total_foreign,
            cash_local,
        })
    }
}
