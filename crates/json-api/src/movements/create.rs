//! Create Movement Handler

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use stocksync_app::{
    domain::{
        movements::MovementKind,
        stock::{MovementRequest, StockServiceError},
    },
    realtime::publish_mutation,
};

use crate::{
    extensions::*,
    movements::errors::into_status_error,
    observability::metrics,
    products::responses::{MovementResponse, ProductResponse},
};

/// Create Movement Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateMovementRequest {
    /// Product to adjust
    pub product_id: Uuid,

    /// `IN` or `OUT`
    #[serde(rename = "type")]
    pub kind: String,

    /// Units to move, at least 1
    pub quantity: i64,

    /// Free-text notes; a default is recorded when omitted
    #[serde(default)]
    pub notes: Option<String>,
}

impl TryFrom<CreateMovementRequest> for MovementRequest {
    type Error = StockServiceError;

    fn try_from(request: CreateMovementRequest) -> Result<Self, Self::Error> {
        Ok(MovementRequest {
            product: request.product_id.into(),
            kind: request.kind.parse::<MovementKind>()?,
            quantity: request.quantity,
            notes: request.notes,
        })
    }
}

/// Movement Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MovementCreatedResponse {
    pub message: String,

    /// Product after the movement
    pub product: ProductResponse,

    /// The recorded ledger entry
    pub movement: MovementResponse,

    /// Connected clients were sent the outcome
    pub real_time_update: bool,
}

/// Create Movement Handler
///
/// Applies a stock movement, records it in the ledger and pushes the outcome to connected
/// clients.
#[endpoint(
    tags("movements"),
    summary = "Create Stock Movement",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Stock updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid quantity or movement type"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Inventory store unavailable"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateMovementRequest>,
    depot: &mut Depot,
) -> Result<Json<MovementCreatedResponse>, StatusError> {
    let state = depot.state_or_500()?;

    let request = MovementRequest::try_from(json.into_inner()).map_err(into_status_error)?;

    let mutation = state
        .app
        .stock
        .apply_movement(request)
        .await
        .map_err(into_status_error)?;

    metrics::observe_movement(mutation.movement.kind, mutation.alert);

    let delivery = publish_mutation(&state.app.broadcaster, &mutation);

    debug!(
        product = %mutation.product.uuid,
        delivered = delivery.stock_update.delivered,
        dropped = delivery.stock_update.dropped,
        alert_delivered = delivery.alert.map(|alert| alert.delivered),
        "movement broadcast"
    );

    Ok(Json(MovementCreatedResponse {
        message: "Stock updated successfully".to_string(),
        product: mutation.product.into(),
        movement: mutation.movement.into(),
        real_time_update: true,
    }))
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        test::{ResponseExt, TestClient},
    };
    use serde_json::json;
    use testresult::TestResult;

    use stocksync_app::{
        dashboard::{MovementDraft, ProductView},
        domain::{
            products::records::ProductUuid,
            stock::{MockStockService, StockAlert, StockMutation},
        },
        realtime::{Broadcaster, LowStockAlert, ServerEvent, StockUpdate},
    };

    use crate::test_helpers::{
        make_movement, make_product, service, state_with_broadcaster, strict_products_mock,
    };

    use super::*;

    fn route() -> Router {
        Router::with_path("api/movements").post(handler)
    }

    fn make_service(stock: MockStockService) -> Service {
        service(strict_products_mock(), stock, route())
    }

    fn mutation(uuid: ProductUuid, previous_stock: u64, quantity: u64) -> StockMutation {
        let product = make_product(uuid, previous_stock.saturating_sub(quantity), 10);

        StockMutation {
            previous_stock,
            alert: StockAlert::derive(product.current_stock, product.safety_stock),
            movement: make_movement(uuid, MovementKind::Out, quantity),
            product,
        }
    }

    #[tokio::test]
    async fn test_create_movement_returns_mutation() -> TestResult {
        let uuid = ProductUuid::new();
        let outcome = mutation(uuid, 25, 20);
        let mut stock = MockStockService::new();

        stock
            .expect_apply_movement()
            .once()
            .withf(move |request| {
                *request
                    == MovementRequest {
                        product: uuid,
                        kind: MovementKind::Out,
                        quantity: 20,
                        notes: None,
                    }
            })
            .return_once(move |_| Ok(outcome));

        stock.expect_list_movements().never();

        let mut res = TestClient::post("http://example.com/api/movements")
            .json(&json!({ "productId": uuid.into_uuid(), "type": "OUT", "quantity": 20 }))
            .send(&make_service(stock))
            .await;

        let body: MovementCreatedResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.message, "Stock updated successfully");
        assert_eq!(body.product.current_stock, 5);
        assert_eq!(body.movement.kind, "OUT");
        assert_eq!(body.movement.quantity, 20);
        assert!(body.real_time_update);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_movement_broadcasts_update_then_alert() -> TestResult {
        let uuid = ProductUuid::new();
        let outcome = mutation(uuid, 25, 20);
        let mut stock = MockStockService::new();

        stock
            .expect_apply_movement()
            .once()
            .return_once(move |_| Ok(outcome));

        stock.expect_list_movements().never();

        let broadcaster = Broadcaster::default();
        let mut subscription = broadcaster.connect();

        let service = Service::new(
            Router::new()
                .hoop(inject(state_with_broadcaster(
                    strict_products_mock(),
                    stock,
                    broadcaster,
                    None,
                )))
                .push(route()),
        );

        let res = TestClient::post("http://example.com/api/movements")
            .json(&json!({ "productId": uuid.into_uuid(), "type": "OUT", "quantity": 20 }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(matches!(
            subscription.events.try_recv().ok(),
            Some(ServerEvent::StockUpdate(StockUpdate {
                previous_stock: Some(25),
                new_stock: 5,
                ..
            }))
        ));
        assert!(matches!(
            subscription.events.try_recv().ok(),
            Some(ServerEvent::LowStockAlert(LowStockAlert {
                current_stock: 5,
                out_of_stock: false,
                ..
            }))
        ));

        Ok(())
    }

    #[test]
    fn dashboard_draft_reads_as_request() -> TestResult {
        let uuid = ProductUuid::new();
        let draft = MovementDraft {
            product_id: uuid.into_uuid(),
            kind: MovementKind::In,
            quantity: 12,
            notes: None,
        };

        let request: CreateMovementRequest = serde_json::from_value(serde_json::to_value(&draft)?)?;

        assert_eq!(
            MovementRequest::try_from(request)?,
            MovementRequest {
                product: uuid,
                kind: MovementKind::In,
                quantity: 12,
                notes: None,
            }
        );

        Ok(())
    }

    #[test]
    fn created_response_carries_dashboard_view() -> TestResult {
        #[derive(Deserialize)]
        struct Confirmed {
            product: ProductView,
        }

        let outcome = mutation(ProductUuid::new(), 25, 20);
        let expected = ProductView::from(outcome.product.clone());

        let body = serde_json::to_string(&MovementCreatedResponse {
            message: "Stock updated successfully".to_string(),
            product: outcome.product.into(),
            movement: outcome.movement.into(),
            real_time_update: true,
        })?;

        let confirmed: Confirmed = serde_json::from_str(&body)?;

        assert_eq!(confirmed.product, expected);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_type_returns_400_without_touching_stock() {
        let mut stock = MockStockService::new();

        stock.expect_apply_movement().never();
        stock.expect_list_movements().never();

        let res = TestClient::post("http://example.com/api/movements")
            .json(&json!({ "productId": Uuid::now_v7(), "type": "SIDEWAYS", "quantity": 2 }))
            .send(&make_service(stock))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_zero_quantity_returns_400() {
        let mut stock = MockStockService::new();

        stock
            .expect_apply_movement()
            .once()
            .return_once(|request| Err(StockServiceError::InvalidQuantity(request.quantity)));

        stock.expect_list_movements().never();

        let res = TestClient::post("http://example.com/api/movements")
            .json(&json!({ "productId": Uuid::now_v7(), "type": "IN", "quantity": 0 }))
            .send(&make_service(stock))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_unknown_product_returns_404() {
        let mut stock = MockStockService::new();

        stock
            .expect_apply_movement()
            .once()
            .return_once(|_| Err(StockServiceError::NotFound));

        stock.expect_list_movements().never();

        let res = TestClient::post("http://example.com/api/movements")
            .json(&json!({ "productId": Uuid::now_v7(), "type": "IN", "quantity": 1 }))
            .send(&make_service(stock))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_unavailable_store_returns_503() {
        let mut stock = MockStockService::new();

        stock
            .expect_apply_movement()
            .once()
            .return_once(|_| Err(StockServiceError::Unavailable(sqlx::Error::PoolTimedOut)));

        stock.expect_list_movements().never();

        let res = TestClient::post("http://example.com/api/movements")
            .json(&json!({ "productId": Uuid::now_v7(), "type": "IN", "quantity": 1 }))
            .send(&make_service(stock))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));
    }
}
