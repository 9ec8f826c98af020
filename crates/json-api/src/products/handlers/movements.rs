//! Product Movements Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, movements::errors::into_status_error, products::responses::MovementResponse};

/// Product Movements Handler
///
/// Returns the product's ledger in the order the movements were recorded.
#[endpoint(
    tags("products"),
    summary = "List Product Movements",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Movements, oldest first"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Vec<MovementResponse>>, StatusError> {
    let state = depot.state_or_500()?;

    let movements = state
        .app
        .stock
        .list_movements(product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(movements.into_iter().map(Into::into).collect()))
}
