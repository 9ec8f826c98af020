//! Overdraft policy and the stock arithmetic it governs.

use std::str::FromStr;

use thiserror::Error;

use crate::domain::{movements::MovementKind, stock::errors::StockServiceError};

/// What to do with an `OUT` movement larger than the stock on hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverdraftPolicy {
    /// Truncate at zero and record the requested quantity.
    #[default]
    Clamp,

    /// Refuse the movement.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown overdraft policy {0:?}, expected clamp or reject")]
pub struct InvalidOverdraftPolicy(pub String);

impl FromStr for OverdraftPolicy {
    type Err = InvalidOverdraftPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "reject" => Ok(Self::Reject),
            _ => Err(InvalidOverdraftPolicy(value.to_string())),
        }
    }
}

/// Resulting stock level and the quantity that actually moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub previous_stock: u64,
    pub new_stock: u64,
    pub applied_quantity: u64,
}

impl StockChange {
    #[must_use]
    pub const fn was_clamped(&self, quantity: u64) -> bool {
        self.applied_quantity < quantity
    }
}

/// Compute the stock level after moving `quantity` units.
///
/// # Errors
///
/// Returns [`StockServiceError::InsufficientStock`] for an overdrawing `OUT` under
/// [`OverdraftPolicy::Reject`], and [`StockServiceError::StockOverflow`] when an `IN`
/// would exceed the representable range.
pub fn next_stock(
    current: u64,
    kind: MovementKind,
    quantity: u64,
    policy: OverdraftPolicy,
) -> Result<StockChange, StockServiceError> {
    match kind {
        MovementKind::In => {
            let new_stock = current
                .checked_add(quantity)
                .filter(|stock| i64::try_from(*stock).is_ok())
                .ok_or(StockServiceError::StockOverflow)?;

            Ok(StockChange {
                previous_stock: current,
                new_stock,
                applied_quantity: quantity,
            })
        }
        MovementKind::Out => {
            if quantity > current && policy == OverdraftPolicy::Reject {
                return Err(StockServiceError::InsufficientStock {
                    available: current,
                    requested: quantity,
                });
            }

            let applied_quantity = quantity.min(current);

            Ok(StockChange {
                previous_stock: current,
                new_stock: current - applied_quantity,
                applied_quantity,
            })
        }
    }
}
