//! Test Helpers

use crate::domain::products::{data::NewProduct, records::ProductUuid};

pub(crate) fn new_product(
    uuid: ProductUuid,
    sku: &str,
    current_stock: u64,
    safety_stock: u64,
) -> NewProduct {
    NewProduct {
        uuid,
        name: format!("Product {sku}"),
        sku: sku.to_string(),
        current_stock,
        safety_stock,
        location: None,
    }
}
