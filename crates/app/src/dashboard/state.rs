//! Dashboard State
//!
//! Local product map kept in step with bulk fetches, pushed events and the user's own
//! optimistic adjustments.

use std::collections::{BTreeMap, VecDeque};

use jiff::Timestamp;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dashboard::{
        api::{StockApi, StockApiError},
        history::ScanHistory,
        models::{MovementDraft, ProductView, ScanRecord, StockSummary},
    },
    domain::movements::MovementKind,
    realtime::events::{BarcodeScan, LowStockAlert, ServerEvent, StockUpdate},
};

pub const ALERT_FEED_CAPACITY: usize = 50;

/// What happens to an optimistic value when the server rejects the movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptimisticPolicy {
    /// Restore the value shown before the adjustment.
    #[default]
    Rollback,

    /// Leave the optimistic value on screen until the next refresh.
    KeepOptimistic,
}

/// Effect of applying one pushed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    StockPatched { product: Uuid, new_stock: u64 },
    UnknownProduct { product: Uuid },
    ScanMatched { product: Uuid },
    ScanUnmatched,
    AlertRecorded,
}

#[derive(Debug, Error)]
pub enum AdjustError {
    #[error("adjustment must change the stock level")]
    ZeroDelta,

    #[error("product is not loaded")]
    UnknownProduct,

    #[error(transparent)]
    Api(#[from] StockApiError),
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    policy: OptimisticPolicy,
    products: BTreeMap<Uuid, ProductView>,
    selected: Option<Uuid>,
    scans: ScanHistory,
    alerts: VecDeque<LowStockAlert>,
    last_error: Option<String>,
}

impl DashboardState {
    #[must_use]
    pub fn new(policy: OptimisticPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Replace local products with a bulk fetch.
    pub fn seed(&mut self, products: Vec<ProductView>) {
        self.products = products
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        if self
            .selected
            .is_some_and(|id| !self.products.contains_key(&id))
        {
            self.selected = None;
        }

        self.last_error = None;
    }

    pub fn apply(&mut self, event: ServerEvent) -> Reconciled {
        match event {
            ServerEvent::StockUpdate(update) => self.apply_stock_update(&update),
            ServerEvent::BarcodeScan(scan) => self.record_scan(scan),
            ServerEvent::LowStockAlert(alert) => {
                self.alerts.push_front(alert);
                self.alerts.truncate(ALERT_FEED_CAPACITY);

                Reconciled::AlertRecorded
            }
        }
    }

    fn apply_stock_update(&mut self, update: &StockUpdate) -> Reconciled {
        let Some(product) = self.products.get_mut(&update.product_id) else {
            debug!(product = %update.product_id, "ignoring update for unknown product");

            return Reconciled::UnknownProduct {
                product: update.product_id,
            };
        };

        product.current_stock = update.new_stock;

        Reconciled::StockPatched {
            product: update.product_id,
            new_stock: update.new_stock,
        }
    }

    fn record_scan(&mut self, scan: BarcodeScan) -> Reconciled {
        let barcode = scan.barcode.trim();

        let product = self
            .products
            .values()
            .find(|product| product.sku == barcode)
            .map(|product| product.id);

        self.scans.push(ScanRecord {
            barcode: barcode.to_string(),
            timestamp: scan.timestamp,
            product,
            matched: product.is_some(),
        });

        match product {
            Some(id) => {
                self.selected = Some(id);
                Reconciled::ScanMatched { product: id }
            }
            None => Reconciled::ScanUnmatched,
        }
    }

    /// Record a scan made on this client.
    pub fn scan(&mut self, barcode: &str) -> Reconciled {
        self.record_scan(BarcodeScan {
            barcode: barcode.to_string(),
            timestamp: Timestamp::now(),
        })
    }

    /// Reload every product. On failure the current products stay in place.
    ///
    /// # Errors
    ///
    /// Returns the API error, which is also kept as [`Self::last_error`].
    pub async fn refresh(&mut self, api: &dyn StockApi) -> Result<usize, StockApiError> {
        match api.fetch_products().await {
            Ok(products) => {
                let count = products.len();
                self.seed(products);

                Ok(count)
            }
            Err(error) => {
                warn!(%error, "refresh failed, keeping last known products");
                self.last_error = Some(error.to_string());

                Err(error)
            }
        }
    }

    /// Adjust a product's stock by `delta`, showing the result before the server confirms it.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero delta, an unloaded product, or a failed submission.
    pub async fn adjust_stock(
        &mut self,
        api: &dyn StockApi,
        product: Uuid,
        delta: i64,
    ) -> Result<ProductView, AdjustError> {
        if delta == 0 {
            return Err(AdjustError::ZeroDelta);
        }

        let view = self
            .products
            .get_mut(&product)
            .ok_or(AdjustError::UnknownProduct)?;

        let before = view.current_stock;
        view.current_stock = before.saturating_add_signed(delta);

        let draft = MovementDraft {
            product_id: product,
            kind: if delta > 0 {
                MovementKind::In
            } else {
                MovementKind::Out
            },
            quantity: delta.unsigned_abs(),
            notes: None,
        };

        match api.submit_movement(draft).await {
            Ok(confirmed) => {
                self.products.insert(confirmed.id, confirmed.clone());
                self.last_error = None;

                Ok(confirmed)
            }
            Err(error) => {
                if self.policy == OptimisticPolicy::Rollback
                    && let Some(view) = self.products.get_mut(&product)
                {
                    view.current_stock = before;
                }

                warn!(%product, %error, policy = ?self.policy, "stock adjustment failed");
                self.last_error = Some(error.to_string());

                Err(error.into())
            }
        }
    }

    pub fn product(&self, id: Uuid) -> Option<&ProductView> {
        self.products.get(&id)
    }

    pub fn products(&self) -> impl Iterator<Item = &ProductView> {
        self.products.values()
    }

    pub fn selected(&self) -> Option<&ProductView> {
        self.selected.and_then(|id| self.products.get(&id))
    }

    pub fn select(&mut self, id: Option<Uuid>) {
        self.selected = id.filter(|id| self.products.contains_key(id));
    }

    pub const fn scans(&self) -> &ScanHistory {
        &self.scans
    }

    pub fn alerts(&self) -> impl Iterator<Item = &LowStockAlert> {
        self.alerts.iter()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn summary(&self) -> StockSummary {
        StockSummary::from_products(self.products.values())
    }
}
