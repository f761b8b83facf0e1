//! Core business logic: page parsing, price extraction and valuation

pub mod config;
pub mod extract;
pub mod html;
pub mod label;
pub mod log;
pub mod page;
pub mod price;
pub mod valuation;

// Re-export main types for cleaner imports
pub use extract::PriceExtractor;
pub use page::PageSource;
pub use price::{PriceRecord, Snapshot};
pub use valuation::{Holdings, ValuationEngine, ValuationError, ValuationSummary};
