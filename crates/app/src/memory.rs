//! In-memory inventory backend.
//!
//! Non-persistent implementation of [`ProductsService`] and [`StockService`] for development
//! and docker-free tests. One async mutex guards the whole inventory, so each mutation runs
//! start-to-finish before the next one reads.

use std::collections::HashMap;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::{
    movements::MovementRecord,
    products::{
        ProductsService, ProductsServiceError,
        data::NewProduct,
        records::{ProductRecord, ProductUuid},
    },
    stock::{
        MovementRequest, OverdraftPolicy, StockAlert, StockMutation, StockService,
        StockServiceError, plan::MovementPlan,
    },
};

#[derive(Debug, Default)]
struct Inventory {
    products: Vec<ProductRecord>,
    movements: HashMap<ProductUuid, Vec<MovementRecord>>,
}

impl Inventory {
    fn product(&self, uuid: ProductUuid) -> Option<&ProductRecord> {
        self.products.iter().find(|product| product.uuid == uuid)
    }

    fn product_mut(&mut self, uuid: ProductUuid) -> Option<&mut ProductRecord> {
        self.products.iter_mut().find(|product| product.uuid == uuid)
    }
}

#[derive(Debug)]
pub struct InMemoryInventory {
    policy: OverdraftPolicy,
    inventory: Mutex<Inventory>,
}

impl InMemoryInventory {
    #[must_use]
    pub fn new(policy: OverdraftPolicy) -> Self {
        Self {
            policy,
            inventory: Mutex::new(Inventory::default()),
        }
    }
}

#[async_trait]
impl ProductsService for InMemoryInventory {
    async fn list_products(&self) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        Ok(self.inventory.lock().await.products.clone())
    }

    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, ProductsServiceError> {
        self.inventory
            .lock()
            .await
            .product(product)
            .cloned()
            .ok_or(ProductsServiceError::NotFound)
    }

    async fn find_by_sku(&self, sku: &str) -> Result<ProductRecord, ProductsServiceError> {
        let sku = sku.trim();

        self.inventory
            .lock()
            .await
            .products
            .iter()
            .find(|product| product.sku == sku)
            .cloned()
            .ok_or(ProductsServiceError::NotFound)
    }

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let product = product.normalized()?;

        i64::try_from(product.current_stock)?;
        i64::try_from(product.safety_stock)?;

        let mut inventory = self.inventory.lock().await;

        if inventory
            .products
            .iter()
            .any(|existing| existing.uuid == product.uuid || existing.sku == product.sku)
        {
            return Err(ProductsServiceError::AlreadyExists);
        }

        let now = Timestamp::now();

        let record = ProductRecord {
            uuid: product.uuid,
            name: product.name,
            sku: product.sku,
            current_stock: product.current_stock,
            safety_stock: product.safety_stock,
            location: product.location,
            created_at: now,
            updated_at: now,
        };

        inventory.products.push(record.clone());

        Ok(record)
    }

    async fn delete_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError> {
        let mut inventory = self.inventory.lock().await;

        let before = inventory.products.len();

        inventory.products.retain(|existing| existing.uuid != product);

        if inventory.products.len() == before {
            return Err(ProductsServiceError::NotFound);
        }

        inventory.movements.remove(&product);

        Ok(())
    }
}

#[async_trait]
impl StockService for InMemoryInventory {
    async fn apply_movement(
        &self,
        request: MovementRequest,
    ) -> Result<StockMutation, StockServiceError> {
        request.quantity()?;

        let mut inventory = self.inventory.lock().await;

        let snapshot = inventory
            .product(request.product)
            .ok_or(StockServiceError::NotFound)?;

        // Planning fails before anything is written, so an error leaves no partial state.
        let plan = MovementPlan::new(snapshot, &request, self.policy)?;
        let now = Timestamp::now();

        let movement = MovementRecord {
            uuid: plan.entry.uuid,
            product_uuid: plan.entry.product,
            kind: plan.entry.kind,
            quantity: plan.entry.quantity,
            applied_quantity: plan.entry.applied_quantity,
            notes: Some(plan.entry.notes),
            created_at: now,
        };

        let product = inventory
            .product_mut(request.product)
            .ok_or(StockServiceError::NotFound)?;

        product.current_stock = plan.change.new_stock;
        product.updated_at = now;

        let product = product.clone();

        inventory
            .movements
            .entry(product.uuid)
            .or_default()
            .push(movement.clone());

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
        let inventory = self.inventory.lock().await;

        if inventory.product(product).is_none() {
            return Err(StockServiceError::NotFound);
        }

        Ok(inventory
            .movements
            .get(&product)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use testresult::TestResult;

    use crate::{
        domain::movements::{MovementKind, net_change},
        test::helpers::new_product,
    };

    use super::*;

    fn request(product: ProductUuid, kind: MovementKind, quantity: i64) -> MovementRequest {
        MovementRequest {
            product,
            kind,
            quantity,
            notes: None,
        }
    }

    async fn seeded(
        inventory: &InMemoryInventory,
        sku: &str,
        current: u64,
        safety: u64,
    ) -> TestResult<ProductUuid> {
        let uuid = ProductUuid::new();

        inventory
            .create_product(new_product(uuid, sku, current, safety))
            .await?;

        Ok(uuid)
    }

    #[tokio::test]
    async fn scenario_out_twenty_then_out_ten() -> TestResult {
        let inventory = InMemoryInventory::new(OverdraftPolicy::Clamp);
        let uuid = seeded(&inventory, "IP15-001", 25, 10).await?;

        let first = inventory
            .apply_movement(request(uuid, MovementKind::Out, 20))
            .await?;

        assert_eq!(first.product.current_stock, 5);
        assert_eq!(first.alert, Some(StockAlert::LowStock));

        let second = inventory
            .apply_movement(request(uuid, MovementKind::Out, 10))
            .await?;

        assert_eq!(second.previous_stock, 5);
        assert_eq!(second.product.current_stock, 0);
        assert_eq!(second.alert, Some(StockAlert::OutOfStock));

        Ok(())
    }

    #[tokio::test]
    async fn each_mutation_appends_one_matching_movement() -> TestResult {
        let inventory = InMemoryInventory::new(OverdraftPolicy::Clamp);
        let uuid = seeded(&inventory, "SG24-002", 8, 15).await?;

        let mutation = inventory
            .apply_movement(MovementRequest {
                product: uuid,
                kind: MovementKind::In,
                quantity: 12,
                notes: Some("restock from supplier".to_string()),
            })
            .await?;

        let ledger = inventory.list_movements(uuid).await?;

        assert_eq!(ledger, vec![mutation.movement.clone()]);
        assert_eq!(mutation.movement.kind, MovementKind::In);
        assert_eq!(mutation.movement.quantity, 12);
        assert_eq!(
            mutation.movement.notes.as_deref(),
            Some("restock from supplier")
        );

        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_has_no_effect() -> TestResult {
        let inventory = InMemoryInventory::new(OverdraftPolicy::Reject);
        let uuid = seeded(&inventory, "MBP14-003", 5, 8).await?;

        let result = inventory
            .apply_movement(request(uuid, MovementKind::Out, 6))
            .await;

        assert!(matches!(
            result,
            Err(StockServiceError::InsufficientStock { .. })
        ));
        assert_eq!(inventory.get_product(uuid).await?.current_stock, 5);
        assert!(inventory.list_movements(uuid).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn unknown_product_returns_not_found() {
        let inventory = InMemoryInventory::new(OverdraftPolicy::Clamp);

        let result = inventory
            .apply_movement(request(ProductUuid::new(), MovementKind::In, 1))
            .await;

        assert!(matches!(result, Err(StockServiceError::NotFound)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_outs_never_lose_an_update() -> TestResult {
        let inventory = Arc::new(InMemoryInventory::new(OverdraftPolicy::Clamp));
        let uuid = seeded(&inventory, "APP-005", 8, 20).await?;

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let inventory = Arc::clone(&inventory);
                tokio::spawn(async move {
                    inventory
                        .apply_movement(request(uuid, MovementKind::Out, 5))
                        .await
                })
            })
            .collect();

        for task in tasks {
            task.await??;
        }

        let ledger = inventory.list_movements(uuid).await?;

        assert_eq!(inventory.get_product(uuid).await?.current_stock, 0);
        assert_eq!(ledger.len(), 2);
        assert_eq!(8 + net_change(&ledger), 0);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_sku_is_rejected() -> TestResult {
        let inventory = InMemoryInventory::new(OverdraftPolicy::Clamp);

        seeded(&inventory, "IPA-004", 18, 12).await?;

        let result = inventory
            .create_product(new_product(ProductUuid::new(), "IPA-004", 1, 1))
            .await;

        assert!(matches!(result, Err(ProductsServiceError::AlreadyExists)));

        Ok(())
    }

    #[tokio::test]
    async fn deleting_a_product_drops_its_ledger() -> TestResult {
        let inventory = InMemoryInventory::new(OverdraftPolicy::Clamp);
        let uuid = seeded(&inventory, "IP15-001", 25, 10).await?;

        inventory
            .apply_movement(request(uuid, MovementKind::In, 1))
            .await?;
        inventory.delete_product(uuid).await?;

        assert!(matches!(
            inventory.list_movements(uuid).await,
            Err(StockServiceError::NotFound)
        ));
        assert!(matches!(
            inventory.find_by_sku("IP15-001").await,
            Err(ProductsServiceError::NotFound)
        ));

        Ok(())
    }
}
