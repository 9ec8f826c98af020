//! Dashboard view models.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{movements::MovementKind, products::records::ProductRecord, stock::StockAlert};

/// A product as the dashboard sees it on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub current_stock: u64,
    pub safety_stock: u64,

    #[serde(default)]
    pub location: Option<String>,
}

impl ProductView {
    #[must_use]
    pub const fn alert(&self) -> Option<StockAlert> {
        StockAlert::derive(self.current_stock, self.safety_stock)
    }
}

impl From<ProductRecord> for ProductView {
    fn from(record: ProductRecord) -> Self {
        Self {
            id: record.uuid.into_uuid(),
            name: record.name,
            sku: record.sku,
            current_stock: record.current_stock,
            safety_stock: record.safety_stock,
            location: record.location,
        }
    }
}

/// Movement submitted by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDraft {
    pub product_id: Uuid,

    #[serde(rename = "type")]
    pub kind: MovementKind,

    pub quantity: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One entry of the recent-scans list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    pub barcode: String,
    pub timestamp: Timestamp,

    /// Product the barcode resolved to, by sku.
    pub product: Option<Uuid>,
    pub matched: bool,
}

/// Gauge figures over the current product set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockSummary {
    pub total: usize,
    pub in_stock: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,

    /// Share of products above their safety level, rounded. Zero when there are no products.
    pub health_percent: u8,
}

impl StockSummary {
    pub fn from_products<'a>(products: impl IntoIterator<Item = &'a ProductView>) -> Self {
        let mut summary = Self::default();

        for product in products {
            summary.total += 1;

            match product.alert() {
                Some(StockAlert::OutOfStock) => summary.out_of_stock += 1,
                Some(StockAlert::LowStock) => summary.low_stock += 1,
                None => summary.in_stock += 1,
            }
        }

        if summary.total > 0 {
            let percent = (summary.in_stock * 100 + summary.total / 2) / summary.total;
            summary.health_percent = u8::try_from(percent).unwrap_or(100);
        }

        summary
    }
}
