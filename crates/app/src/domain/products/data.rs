//! Products Data

use crate::domain::products::{errors::ProductsServiceError, records::ProductUuid};

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub sku: String,
    pub current_stock: u64,
    pub safety_stock: u64,
    pub location: Option<String>,
}

impl NewProduct {
    /// Trim the text fields and reject blank names or SKUs.
    ///
    /// # Errors
    ///
    /// Returns [`ProductsServiceError::InvalidData`] when `name` or `sku` is blank.
    pub fn normalized(self) -> Result<Self, ProductsServiceError> {
        let name = self.name.trim().to_string();
        let sku = self.sku.trim().to_string();

        if name.is_empty() || sku.is_empty() {
            return Err(ProductsServiceError::InvalidData);
        }

        let location = self
            .location
            .map(|location| location.trim().to_string())
            .filter(|location| !location.is_empty());

        Ok(Self {
            name,
            sku,
            location,
            ..self
        })
    }
}
