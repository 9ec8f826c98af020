//! Product Index Handler

use salvo::prelude::*;

use crate::{
    extensions::*,
    products::{errors::into_status_error, responses::ProductResponse},
};

/// Product Index Handler
///
/// Returns every product, oldest first. Dashboards seed their local state from this list.
#[endpoint(
    tags("products"),
    summary = "List Products",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Products"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Inventory store unavailable"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<ProductResponse>>, StatusError> {
    let state = depot.state_or_500()?;

    let products = state
        .app
        .products
        .list_products()
        .await
        .map_err(into_status_error)?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use stocksync_app::domain::products::{
        MockProductsService, ProductsServiceError, records::ProductUuid,
    };

    use crate::test_helpers::{make_product, products_service};

    use super::*;

    fn never_except_list(repo: &mut MockProductsService) {
        repo.expect_get_product().never();
        repo.expect_find_by_sku().never();
        repo.expect_create_product().never();
        repo.expect_delete_product().never();
    }

    fn make_service(repo: MockProductsService) -> Service {
        products_service(repo, Router::with_path("api/products").get(handler))
    }

    #[tokio::test]
    async fn test_index_returns_bare_array() -> TestResult {
        let mut repo = MockProductsService::new();
        let first = ProductUuid::new();
        let second = ProductUuid::new();

        repo.expect_list_products()
            .once()
            .return_once(move || Ok(vec![make_product(first, 25, 10), make_product(second, 0, 8)]));

        never_except_list(&mut repo);

        let mut res = TestClient::get("http://example.com/api/products")
            .send(&make_service(repo))
            .await;

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.as_array().map(Vec::len), Some(2));
        assert_eq!(body[0]["id"], serde_json::json!(first.into_uuid()));
        assert_eq!(body[0]["currentStock"], 25);
        assert_eq!(body[0]["alert"], serde_json::Value::Null);
        assert_eq!(body[1]["alert"], "outOfStock");

        Ok(())
    }

    #[tokio::test]
    async fn test_index_unavailable_store_returns_503() {
        let mut repo = MockProductsService::new();

        repo.expect_list_products()
            .once()
            .return_once(|| Err(ProductsServiceError::Unavailable(sqlx::Error::PoolTimedOut)));

        never_except_list(&mut repo);

        let res = TestClient::get("http://example.com/api/products")
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));
    }
}
