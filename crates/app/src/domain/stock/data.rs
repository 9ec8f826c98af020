//! Stock mutation requests and outcomes.

use crate::domain::{
    movements::{MovementKind, MovementRecord},
    products::records::{ProductRecord, ProductUuid},
    stock::{alerts::StockAlert, errors::StockServiceError},
};

/// A request to move stock in or out of a product.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementRequest {
    pub product: ProductUuid,
    pub kind: MovementKind,

    /// Requested quantity; must be at least 1. Kept signed so a bad value reaches validation
    /// instead of failing to deserialize.
    pub quantity: i64,

    pub notes: Option<String>,
}

impl MovementRequest {
    /// The validated quantity.
    ///
    /// # Errors
    ///
    /// Returns [`StockServiceError::InvalidQuantity`] when the quantity is below 1.
    pub fn quantity(&self) -> Result<u64, StockServiceError> {
        u64::try_from(self.quantity)
            .ok()
            .filter(|quantity| *quantity >= 1)
            .ok_or(StockServiceError::InvalidQuantity(self.quantity))
    }

    /// Notes with surrounding whitespace removed, or `None` when blank.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
    }
}

/// Outcome of a successful movement, handed to the broadcaster.
#[derive(Debug, Clone, PartialEq)]
pub struct StockMutation {
    pub previous_stock: u64,
    pub product: ProductRecord,
    pub movement: MovementRecord,
    pub alert: Option<StockAlert>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(quantity: i64, notes: Option<&str>) -> MovementRequest {
        MovementRequest {
            product: ProductUuid::new(),
            kind: MovementKind::Out,
            quantity,
            notes: notes.map(ToString::to_string),
        }
    }

    #[test]
    fn quantity_accepts_positive_values() {
        assert_eq!(request(1, None).quantity().ok(), Some(1));
        assert_eq!(request(20, None).quantity().ok(), Some(20));
    }

    #[test]
    fn quantity_rejects_zero_and_negative_values() {
        assert!(matches!(
            request(0, None).quantity(),
            Err(StockServiceError::InvalidQuantity(0))
        ));
        assert!(matches!(
            request(-3, None).quantity(),
            Err(StockServiceError::InvalidQuantity(-3))
        ));
    }

    #[test]
    fn blank_notes_are_dropped() {
        assert_eq!(request(1, Some("  ")).notes(), None);
        assert_eq!(request(1, Some(" damaged ")).notes(), Some("damaged"));
    }
}
