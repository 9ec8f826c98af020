//! Real-time Broadcasting
//!
//! Pushes mutation outcomes and scanner activity to connected dashboard clients.

pub mod broadcaster;
pub mod events;

pub use broadcaster::{
    Broadcaster, ConnectionId, DEFAULT_CHANNEL, DEFAULT_SUPERVISOR_CHANNEL, Delivery, Subscription,
};
pub use events::{BarcodeScan, ClientEvent, LowStockAlert, MovementSummary, ServerEvent, StockUpdate};

use crate::domain::stock::StockMutation;

/// Deliveries made for one committed mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationDelivery {
    pub stock_update: Delivery,
    pub alert: Option<Delivery>,
}

/// Publish the outcome of a mutation: the stock update, then its alert if one was derived.
pub fn publish_mutation(broadcaster: &Broadcaster, mutation: &StockMutation) -> MutationDelivery {
    let stock_update = broadcaster.publish_stock_update(StockUpdate::from_mutation(mutation));

    let alert = mutation.alert.map(|alert| {
        broadcaster.publish_low_stock_alert(LowStockAlert::from_mutation(mutation, alert))
    });

    MutationDelivery {
        stock_update,
        alert,
    }
}
