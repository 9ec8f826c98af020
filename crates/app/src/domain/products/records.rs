//! Product Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    /// Unique product identifier.
    pub uuid: ProductUuid,

    /// Display name.
    pub name: String,

    /// Stock keeping unit; unique, and the key barcode scans resolve against.
    pub sku: String,

    /// Units currently on hand.
    pub current_stock: u64,

    /// Reorder threshold.
    pub safety_stock: u64,

    /// Free-text storage location, e.g. an aisle/bin code.
    pub location: Option<String>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
