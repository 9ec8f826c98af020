//! Find Product By SKU Handler

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    extensions::*,
    products::{errors::into_status_error, responses::ProductResponse},
};

/// Find Product By SKU Handler
///
/// Resolves a scanned barcode to its product.
#[endpoint(
    tags("products"),
    summary = "Find Product By SKU",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product"),
        (status_code = StatusCode::NOT_FOUND, description = "No product has this SKU"),
    ),
)]
pub(crate) async fn handler(
    sku: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.state_or_500()?;

    let product = state
        .app
        .products
        .find_by_sku(&sku.into_inner())
        .await
        .map_err(into_status_error)?;

    Ok(Json(product.into()))
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

    fn make_service(repo: MockProductsService) -> Service {
        products_service(repo, Router::with_path("api/products/sku/{sku}").get(handler))
    }

    fn never_except_sku(repo: &mut MockProductsService) {
        repo.expect_list_products().never();
        repo.expect_get_product().never();
        repo.expect_create_product().never();
        repo.expect_delete_product().never();
    }

    #[tokio::test]
    async fn test_find_by_sku_returns_product() -> TestResult {
        let uuid = ProductUuid::new();
        let mut repo = MockProductsService::new();

        repo.expect_find_by_sku()
            .once()
            .withf(|sku| sku == "IP15-001")
            .return_once(move |_| Ok(make_product(uuid, 25, 10)));

        never_except_sku(&mut repo);

        let mut res = TestClient::get("http://example.com/api/products/sku/IP15-001")
            .send(&make_service(repo))
            .await;

        let body: ProductResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.id, uuid.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_sku_returns_404() {
        let mut repo = MockProductsService::new();

        repo.expect_find_by_sku()
            .once()
            .return_once(|_| Err(ProductsServiceError::NotFound));

        never_except_sku(&mut repo);

        let res = TestClient::get("http://example.com/api/products/sku/ZZZZ")
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}
