//! Stock service errors.

use std::num::TryFromIntError;

use sqlx::Error;
use thiserror::Error;

use crate::domain::movements::InvalidMovementKind;

#[derive(Debug, Error)]
pub enum StockServiceError {
    #[error("product not found")]
    NotFound,

    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    #[error(transparent)]
    InvalidType(#[from] InvalidMovementKind),

    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: u64, requested: u64 },

    #[error("stock level out of range")]
    StockOverflow,

    #[error("storage unavailable")]
    Unavailable(#[source] Error),

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("stock value out of range")]
    InvalidStock(#[from] TryFromIntError),
}

impl StockServiceError {
    /// Whether the failure is transient and the request may succeed later.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<Error> for StockServiceError {
    fn from(error: Error) -> Self {
        match error {
            Error::RowNotFound => Self::NotFound,
            Error::PoolTimedOut | Error::PoolClosed | Error::Io(_) | Error::WorkerCrashed => {
                Self::Unavailable(error)
            }
            _ => Self::Sql(error),
        }
    }
}
