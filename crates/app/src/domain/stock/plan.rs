//! Planning a movement against a product snapshot.
//!
//! Storage backends read the product under their own exclusion, plan here, then persist
//! the product update and ledger entry together.

use crate::domain::{
    movements::{MovementUuid, default_notes, repository::MovementEntry},
    products::records::ProductRecord,
    stock::{
        data::MovementRequest,
        errors::StockServiceError,
        policy::{OverdraftPolicy, StockChange, next_stock},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MovementPlan {
    pub change: StockChange,
    pub entry: MovementEntry,
}

impl MovementPlan {
    pub(crate) fn new(
        product: &ProductRecord,
        request: &MovementRequest,
        policy: OverdraftPolicy,
    ) -> Result<Self, StockServiceError> {
        let quantity = request.quantity()?;
        let change = next_stock(product.current_stock, request.kind, quantity, policy)?;

        let notes = request
            .notes()
            .map_or_else(|| default_notes(request.kind, quantity), ToString::to_string);

        Ok(Self {
            change,
            entry: MovementEntry {
                uuid: MovementUuid::new(),
                product: product.uuid,
                kind: request.kind,
                quantity,
                applied_quantity: change.applied_quantity,
                notes,
            },
        })
    }
}
