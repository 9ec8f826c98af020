//! Dashboard Client State
//!
//! Client-side reconciliation of the product list against bulk fetches and pushed events.

pub mod api;
pub mod history;
pub mod models;
pub mod state;

pub use api::{HttpStockApi, StockApi, StockApiError};
pub use history::{SCAN_HISTORY_CAPACITY, ScanHistory};
pub use models::{MovementDraft, ProductView, ScanRecord, StockSummary};
pub use state::{AdjustError, DashboardState, OptimisticPolicy, Reconciled};
