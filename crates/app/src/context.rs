//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        products::{PgProductsService, ProductsService},
        stock::{OverdraftPolicy, PgStockService, StockService},
    },
    memory::InMemoryInventory,
    realtime::Broadcaster,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to run database migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

/// Services shared by every request, plus the broadcaster registry they report to.
#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub stock: Arc<dyn StockService>,
    pub broadcaster: Broadcaster,
}

impl AppContext {
    /// Build application context from a database URL, applying pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting or migrating fails.
    pub async fn from_database_url(
        url: &str,
        policy: OverdraftPolicy,
        broadcaster: Broadcaster,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrate)?;

        let db = Db::new(pool);

        Ok(Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            stock: Arc::new(PgStockService::new(db, policy)),
            broadcaster,
        })
    }

    /// Build application context over a fresh in-memory inventory.
    #[must_use]
    pub fn in_memory(policy: OverdraftPolicy, broadcaster: Broadcaster) -> Self {
        let inventory = Arc::new(InMemoryInventory::new(policy));

        Self {
            products: inventory.clone(),
            stock: inventory,
            broadcaster,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            movements::MovementKind, products::records::ProductUuid, stock::MovementRequest,
        },
        test::helpers::new_product,
    };

    use super::*;

    #[tokio::test]
    async fn in_memory_context_shares_one_inventory() -> TestResult {
        let ctx = AppContext::in_memory(OverdraftPolicy::Clamp, Broadcaster::default());
        let uuid = ProductUuid::new();

        ctx.products
            .create_product(new_product(uuid, "IP15-001", 25, 10))
            .await?;

        ctx.stock
            .apply_movement(MovementRequest {
                product: uuid,
                kind: MovementKind::Out,
                quantity: 20,
                notes: None,
            })
            .await?;

        assert_eq!(ctx.products.get_product(uuid).await?.current_stock, 5);

        Ok(())
    }
}
