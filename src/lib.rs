//! Ingestion and aggregation of advertising spend sheets.
//!
//! Exported CSV sheets are parsed into a [`CanonicalDataset`] (daily platform
//! sheets and the monthly summary sheet share one shape), optionally filtered
//! by date range, aggregated for display, and compared against monthly
//! budgets to report pacing.
pub mod budget;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod pacing;
pub mod reports;
pub mod source;
pub mod state;
pub mod types;
pub mod util;

pub use config::Config;
pub use error::{Error, Result};
pub use types::{BudgetModel, CanonicalDataset, DailyRecord, DateRange, Origin, Platform};
