//! Product and movement response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stocksync_app::domain::{
    movements::MovementRecord, products::records::ProductRecord, stock::StockAlert,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductResponse {
    /// The unique identifier of the product
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Stock keeping unit, also the barcode value
    pub sku: String,

    /// Units on hand
    pub current_stock: u64,

    /// Reorder threshold
    pub safety_stock: u64,

    /// Storage location
    pub location: Option<String>,

    /// Alert the current level implies, if any
    pub alert: Option<String>,

    /// The date and time the product was created
    pub created_at: String,

    /// The date and time the product was last updated
    pub updated_at: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(product: ProductRecord) -> Self {
        let alert = StockAlert::derive(product.current_stock, product.safety_stock)
            .map(|alert| alert.as_str().to_string());

        ProductResponse {
            id: product.uuid.into(),
            name: product.name,
            sku: product.sku,
            current_stock: product.current_stock,
            safety_stock: product.safety_stock,
            location: product.location,
            alert,
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MovementResponse {
    /// The unique identifier of the movement
    pub id: Uuid,

    /// Product the movement applies to
    pub product_id: Uuid,

    /// `IN` or `OUT`
    #[serde(rename = "type")]
    pub kind: String,

    /// Requested quantity
    pub quantity: u64,

    /// Quantity that actually changed the stock level
    pub applied_quantity: u64,

    /// Free-text notes
    pub notes: Option<String>,

    /// The date and time the movement was recorded
    pub created_at: String,
}

impl From<MovementRecord> for MovementResponse {
    fn from(movement: MovementRecord) -> Self {
        MovementResponse {
            id: movement.uuid.into(),
            product_id: movement.product_uuid.into(),
            kind: movement.kind.to_string(),
            quantity: movement.quantity,
            applied_quantity: movement.applied_quantity,
            notes: movement.notes,
            created_at: movement.created_at.to_string(),
        }
    }
}
