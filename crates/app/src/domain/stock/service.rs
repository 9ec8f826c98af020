//! Stock mutation service.

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::{
        movements::{MovementRecord, repository::PgMovementsRepository},
        products::{records::ProductUuid, repository::PgProductsRepository},
        stock::{
            alerts::StockAlert,
            data::{MovementRequest, StockMutation},
            errors::StockServiceError,
            plan::MovementPlan,
            policy::OverdraftPolicy,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgStockService {
    db: Db,
    policy: OverdraftPolicy,
    products: PgProductsRepository,
    movements: PgMovementsRepository,
}

impl PgStockService {
    #[must_use]
    pub fn new(db: Db, policy: OverdraftPolicy) -> Self {
        Self {
            db,
            policy,
            products: PgProductsRepository::new(),
            movements: PgMovementsRepository::new(),
        }
    }
}

#[async_trait]
impl StockService for PgStockService {
    async fn apply_movement(
        &self,
        request: MovementRequest,
    ) -> Result<StockMutation, StockServiceError> {
        request.quantity()?;

        let mut tx = self.db.begin_transaction().await?;

        // The row lock is held until commit, so concurrent movements on this product
        // queue behind us instead of computing from a stale level.
        let product = self.products.lock_product(&mut tx, request.product).await?;

        let plan = MovementPlan::new(&product, &request, self.policy)?;

        if plan.change.was_clamped(plan.entry.quantity) {
            debug!(
                product = %product.uuid,
                requested = plan.entry.quantity,
                applied = plan.change.applied_quantity,
                "clamped OUT movement at zero stock"
            );
        }

        let product = self
            .products
            .set_stock(&mut tx, product.uuid, plan.change.new_stock)
            .await?;

        let movement = self.movements.create_movement(&mut tx, plan.entry).await?;

        tx.commit().await?;

        let alert = StockAlert::derive(product.current_stock, product.safety_stock);

        info!(
            product = %product.uuid,
            kind = %movement.kind,
            quantity = movement.quantity,
            previous_stock = plan.change.previous_stock,
            new_stock = product.current_stock,
            alert = alert.map(StockAlert::as_str),
            "stock movement applied"
        );

        Ok(StockMutation {
            previous_stock: plan.change.previous_stock,
            product,
            movement,
            alert,
        })
    }

    async fn list_movements(
        &self,
        product: ProductUuid,
    ) -> Result<Vec<MovementRecord>, StockServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.products.get_product(&mut tx, product).await?;

        let movements = self
            .movements
            .list_product_movements(&mut tx, product)
            .await?;

        tx.commit().await?;

        Ok(movements)
    }
}

#[automock]
#[async_trait]
pub trait StockService: Send + Sync {
    /// Apply a movement: adjust the product's stock and append the ledger entry atomically.
    async fn apply_movement(
        &self,
        request: MovementRequest,
    ) -> Result<StockMutation, StockServiceError>;

    /// Ledger entries for a product in insertion order.
    async fn list_movements(
        &self,
        product: ProductUuid,
    ) -> Result<Vec<MovementRecord>, StockServiceError>;
}
