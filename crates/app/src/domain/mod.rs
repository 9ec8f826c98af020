//! Inventory Domain Concerns

pub mod movements;
pub mod products;
pub mod stock;
