//! App Router

use salvo::Router;

use crate::{auth, movements, products};

/// Routes under `/api`, all behind the API token check.
pub fn app_router() -> Router {
    Router::with_path("api")
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .post(products::create::handler)
                .push(Router::with_path("sku/{sku}").get(products::sku::handler))
                .push(
                    Router::with_path("{product}")
                        .get(products::get::handler)
                        .delete(products::delete::handler)
                        .push(Router::with_path("movements").get(products::movements::handler)),
                ),
        )
        .push(Router::with_path("movements").post(movements::create::handler))
}
