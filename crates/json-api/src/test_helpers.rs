//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use stocksync_app::{
    context::AppContext,
    domain::{
        movements::{MovementKind, MovementRecord, MovementUuid},
        products::{
            MockProductsService,
            records::{ProductRecord, ProductUuid},
        },
        stock::MockStockService,
    },
    realtime::Broadcaster,
};

use crate::{auth::ApiToken, state::State};

pub(crate) fn strict_products_mock() -> MockProductsService {
    let mut products = MockProductsService::new();

    products.expect_list_products().never();
    products.expect_get_product().never();
    products.expect_find_by_sku().never();
    products.expect_create_product().never();
    products.expect_delete_product().never();

    products
}

pub(crate) fn strict_stock_mock() -> MockStockService {
    let mut stock = MockStockService::new();

    stock.expect_apply_movement().never();
    stock.expect_list_movements().never();

    stock
}

pub(crate) fn state_with(
    products: MockProductsService,
    stock: MockStockService,
    api_token: Option<ApiToken>,
) -> Arc<State> {
    state_with_broadcaster(products, stock, Broadcaster::default(), api_token)
}

pub(crate) fn state_with_broadcaster(
    products: MockProductsService,
    stock: MockStockService,
    broadcaster: Broadcaster,
    api_token: Option<ApiToken>,
) -> Arc<State> {
    State::shared(
        AppContext {
            products: Arc::new(products),
            stock: Arc::new(stock),
            broadcaster,
        },
        api_token,
    )
}

pub(crate) fn products_service(products: MockProductsService, route: Router) -> Service {
    service(products, strict_stock_mock(), route)
}

pub(crate) fn service(products: MockProductsService, stock: MockStockService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with(products, stock, None)))
            .push(route),
    )
}

pub(crate) fn make_product(uuid: ProductUuid, current_stock: u64, safety_stock: u64) -> ProductRecord {
    ProductRecord {
        uuid,
        name: "iPhone 15".to_string(),
        sku: "IP15-001".to_string(),
        current_stock,
        safety_stock,
        location: Some("A1-001".to_string()),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_movement(product: ProductUuid, kind: MovementKind, quantity: u64) -> MovementRecord {
    MovementRecord {
        uuid: MovementUuid::new(),
        product_uuid: product,
        kind,
        quantity,
        applied_quantity: quantity,
        notes: Some(format!("{kind} movement of {quantity} units")),
        created_at: Timestamp::UNIX_EPOCH,
    }
}
