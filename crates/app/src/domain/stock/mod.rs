//! Stock Mutation
//!
//! Applies a movement to a product's stock level and records it in the ledger as one
//! unit, then reports the alert the new level implies.

pub mod alerts;
pub mod data;
pub mod errors;
pub(crate) mod plan;
pub mod policy;
pub mod service;

pub use alerts::StockAlert;
pub use data::{MovementRequest, StockMutation};
pub use errors::StockServiceError;
pub use policy::OverdraftPolicy;
pub use service::*;
