//! Real-time Events
//!
//! Wire shape is `{"event": "<name>", "data": {...}}` with camelCase fields in both directions.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    movements::MovementKind,
    stock::{StockAlert, StockMutation},
};

/// Events pushed from the server to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    StockUpdate(StockUpdate),
    LowStockAlert(LowStockAlert),
    BarcodeScan(BarcodeScan),
}

impl ServerEvent {
    /// Event name as it appears on the wire.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StockUpdate(_) => "stockUpdate",
            Self::LowStockAlert(_) => "lowStockAlert",
            Self::BarcodeScan(_) => "barcodeScan",
        }
    }
}

/// Events received from connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Advisory stock hint, relayed to other clients but never persisted.
    UpdateStock {
        #[serde(rename = "productId")]
        product_id: Uuid,

        #[serde(rename = "newStock")]
        new_stock: u64,
    },
    BarcodeScan(BarcodeScan),

    /// Alert raised by a client, relayed to the other supervisors.
    LowStockAlert(LowStockAlert),

    JoinRoom {
        room: String,
    },
    LeaveRoom {
        room: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub product_id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_stock: Option<u64>,

    pub new_stock: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement: Option<MovementSummary>,
}

impl StockUpdate {
    /// Authoritative update describing a committed mutation.
    #[must_use]
    pub fn from_mutation(mutation: &StockMutation) -> Self {
        Self {
            product_id: mutation.product.uuid.into_uuid(),
            product_name: Some(mutation.product.name.clone()),
            previous_stock: Some(mutation.previous_stock),
            new_stock: mutation.product.current_stock,
            movement: Some(MovementSummary {
                kind: mutation.movement.kind,
                quantity: mutation.movement.quantity,
                timestamp: mutation.movement.created_at,
            }),
        }
    }

    /// Partial update carrying only a client's stock hint.
    #[must_use]
    pub const fn hint(product_id: Uuid, new_stock: u64) -> Self {
        Self {
            product_id,
            product_name: None,
            previous_stock: None,
            new_stock,
            movement: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementSummary {
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub quantity: u64,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockAlert {
    pub product_id: Uuid,
    pub product_name: String,
    pub current_stock: u64,
    pub safety_stock: u64,

    #[serde(default)]
    pub out_of_stock: bool,

    pub timestamp: Timestamp,
}

impl LowStockAlert {
    #[must_use]
    pub fn from_mutation(mutation: &StockMutation, alert: StockAlert) -> Self {
        Self {
            product_id: mutation.product.uuid.into_uuid(),
            product_name: mutation.product.name.clone(),
            current_stock: mutation.product.current_stock,
            safety_stock: mutation.product.safety_stock,
            out_of_stock: alert.is_out_of_stock(),
            timestamp: mutation.movement.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeScan {
    pub barcode: String,
    pub timestamp: Timestamp,
}
