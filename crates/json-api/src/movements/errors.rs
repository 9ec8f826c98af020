//! Movement Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use stocksync_app::domain::stock::StockServiceError;

pub(crate) fn into_status_error(error: StockServiceError) -> StatusError {
    match error {
        StockServiceError::NotFound => StatusError::not_found().brief("Product not found"),
        StockServiceError::InvalidQuantity(_) => {
            StatusError::bad_request().brief("Quantity must be at least 1")
        }
        StockServiceError::InvalidType(source) => StatusError::bad_request().brief(source.to_string()),
        StockServiceError::InsufficientStock {
            available,
            requested,
        } => StatusError::bad_request().brief(format!(
            "Insufficient stock: {available} available, {requested} requested"
        )),
        StockServiceError::StockOverflow => {
            StatusError::bad_request().brief("Resulting stock level is out of range")
        }
        StockServiceError::Unavailable(source) => {
            warn!("stock store unavailable: {source}");

            StatusError::service_unavailable().brief("Inventory store unavailable, retry later")
        }
        StockServiceError::Sql(source) => {
            error!("stock store error: {source}");

            StatusError::internal_server_error()
        }
        StockServiceError::InvalidStock(source) => {
            error!("stored stock value out of range: {source}");

            StatusError::internal_server_error()
        }
    }
}
