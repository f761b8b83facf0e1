//! File-backed stores under the data directory.

pub mod history;
pub mod holdings;
pub mod summary;

pub use history::PriceHistoryStore;
pub use holdings::HoldingsStore;
pub use summary::SummaryLedger;
