//! Product Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use stocksync_app::domain::products::ProductsServiceError;

pub(crate) fn into_status_error(error: ProductsServiceError) -> StatusError {
    match error {
        ProductsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Product with this SKU already exists")
        }
        ProductsServiceError::MissingRequiredData | ProductsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid product payload")
        }
        ProductsServiceError::NotFound => StatusError::not_found().brief("Product not found"),
        ProductsServiceError::Unavailable(source) => {
            warn!("product store unavailable: {source}");

            StatusError::service_unavailable().brief("Inventory store unavailable, retry later")
        }
        ProductsServiceError::Sql(source) => {
            error!("product store error: {source}");

            StatusError::internal_server_error()
        }
        ProductsServiceError::InvalidStock(source) => {
            error!("stored stock value out of range: {source}");

            StatusError::internal_server_error()
        }
    }
}
