//! Broadcaster
//!
//! Connection and channel registry for real-time delivery. Each connection owns one bounded
//! FIFO queue, so events published in sequence reach every recipient in that sequence. A
//! connection whose queue is full is disconnected rather than skipped, so a client never sees
//! a later event without the ones before it.

use std::{
    collections::{BTreeSet, HashMap},
    fmt::{Display, Formatter, Result as FmtResult},
    num::NonZeroUsize,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::mpsc::{Receiver, Sender, channel, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::realtime::events::{BarcodeScan, LowStockAlert, ServerEvent, StockUpdate};

/// Channel every connection joins on connect.
pub const DEFAULT_CHANNEL: &str = "inventory";

/// Restricted audience for low-stock alerts unless configured otherwise.
pub const DEFAULT_SUPERVISOR_CHANNEL: &str = "managers";

/// Events a connection may have queued before it is treated as stalled.
pub const DEFAULT_QUEUE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl Display for ConnectionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "conn-{}", self.0)
    }
}

/// Outcome of a single publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,

    /// Recipients that were closed or had a full queue; they are disconnected.
    pub dropped: usize,
}

/// Receiving half of a registered connection.
#[derive(Debug)]
pub struct Subscription {
    pub id: ConnectionId,
    pub events: Receiver<ServerEvent>,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    connections: HashMap<ConnectionId, Sender<ServerEvent>>,
    channels: HashMap<String, BTreeSet<ConnectionId>>,
}

impl Registry {
    fn remove(&mut self, id: ConnectionId) -> bool {
        let removed = self.connections.remove(&id).is_some();

        self.channels.retain(|_, members| {
            members.remove(&id);
            !members.is_empty()
        });

        removed
    }

    fn members(&self, channel: &str) -> impl Iterator<Item = ConnectionId> + '_ {
        self.channels.get(channel).into_iter().flatten().copied()
    }

    fn recipients(&self, audience: &Audience, supervisor_channel: &str) -> Vec<ConnectionId> {
        match audience {
            Audience::StockWatchers => self
                .members(DEFAULT_CHANNEL)
                .chain(self.members(supervisor_channel))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            Audience::Alerted => {
                if self.channels.contains_key(supervisor_channel) {
                    self.members(supervisor_channel).collect()
                } else {
                    self.members(DEFAULT_CHANNEL).collect()
                }
            }
            Audience::Supervisors { except } => self
                .members(supervisor_channel)
                .filter(|id| id != except)
                .collect(),
            Audience::Everyone { except } => self
                .connections
                .keys()
                .copied()
                .filter(|id| Some(*id) != *except)
                .collect(),
        }
    }
}

enum Audience {
    /// Default channel plus supervisors, so alert recipients also see the update before it.
    StockWatchers,

    /// Supervisor channel, or the default channel when it has no members.
    Alerted,

    Supervisors { except: ConnectionId },
    Everyone { except: Option<ConnectionId> },
}

enum Dropped {
    Closed,
    Lagging,
}

#[derive(Debug, Clone)]
pub struct Broadcaster {
    supervisor_channel: Arc<str>,
    queue_capacity: NonZeroUsize,
    registry: Arc<Mutex<Registry>>,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_SUPERVISOR_CHANNEL)
    }
}

impl Broadcaster {
    #[must_use]
    pub fn new(supervisor_channel: &str) -> Self {
        Self {
            supervisor_channel: Arc::from(supervisor_channel),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    /// Bound each connection's queue. Applies to connections registered afterwards.
    #[must_use]
    pub fn with_queue_capacity(mut self, queue_capacity: NonZeroUsize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    #[must_use]
    pub fn supervisor_channel(&self) -> &str {
        &self.supervisor_channel
    }

    #[must_use]
    pub fn queue_capacity(&self) -> NonZeroUsize {
        self.queue_capacity
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // Registry updates are single map operations, so a poisoned guard still holds
        // consistent state.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a connection and join it to [`DEFAULT_CHANNEL`].
    pub fn connect(&self) -> Subscription {
        let (sender, events) = channel(self.queue_capacity.get());
        let mut registry = self.registry();

        registry.next_id += 1;
        let id = ConnectionId(registry.next_id);

        registry.connections.insert(id, sender);
        registry
            .channels
            .entry(DEFAULT_CHANNEL.to_string())
            .or_default()
            .insert(id);

        debug!(connection = %id, "connection registered");

        Subscription { id, events }
    }

    pub fn disconnect(&self, id: ConnectionId) {
        if self.registry().remove(id) {
            debug!(connection = %id, "connection removed");
        }
    }

    /// Add a connection to a channel. Returns `false` for unknown connections.
    pub fn join(&self, id: ConnectionId, channel: &str) -> bool {
        let mut registry = self.registry();

        if !registry.connections.contains_key(&id) {
            return false;
        }

        registry
            .channels
            .entry(channel.to_string())
            .or_default()
            .insert(id)
    }

    /// Remove a connection from a channel. Returns `false` when it was not a member.
    pub fn leave(&self, id: ConnectionId, channel: &str) -> bool {
        let mut registry = self.registry();

        let Some(members) = registry.channels.get_mut(channel) else {
            return false;
        };

        let removed = members.remove(&id);

        if members.is_empty() {
            registry.channels.remove(channel);
        }

        removed
    }

    pub fn members(&self, channel: &str) -> usize {
        self.registry().channels.get(channel).map_or(0, BTreeSet::len)
    }

    pub fn connection_count(&self) -> usize {
        self.registry().connections.len()
    }

    /// Fan a stock update out to the default channel and the supervisor channel.
    pub fn publish_stock_update(&self, update: StockUpdate) -> Delivery {
        self.deliver(&Audience::StockWatchers, &ServerEvent::StockUpdate(update))
    }

    /// Send an alert to the supervisor channel, or to the default channel when nobody is in it.
    pub fn publish_low_stock_alert(&self, alert: LowStockAlert) -> Delivery {
        self.deliver(&Audience::Alerted, &ServerEvent::LowStockAlert(alert))
    }

    /// Relay a scan verbatim to every connection.
    pub fn publish_barcode_scan(&self, scan: BarcodeScan) -> Delivery {
        self.deliver(
            &Audience::Everyone { except: None },
            &ServerEvent::BarcodeScan(scan),
        )
    }

    /// Relay a client's stock hint to every other connection.
    pub fn relay_stock_hint(&self, sender: ConnectionId, product_id: Uuid, new_stock: u64) -> Delivery {
        self.deliver(
            &Audience::Everyone {
                except: Some(sender),
            },
            &ServerEvent::StockUpdate(StockUpdate::hint(product_id, new_stock)),
        )
    }

    /// Relay a client-raised alert to the other members of the supervisor channel.
    pub fn relay_low_stock_alert(&self, sender: ConnectionId, alert: LowStockAlert) -> Delivery {
        self.deliver(
            &Audience::Supervisors { except: sender },
            &ServerEvent::LowStockAlert(alert),
        )
    }

    /// Drop every connection. Receivers observe end of stream.
    pub fn shutdown(&self) -> usize {
        let mut registry = self.registry();
        let count = registry.connections.len();

        registry.connections.clear();
        registry.channels.clear();

        count
    }

    fn deliver(&self, audience: &Audience, event: &ServerEvent) -> Delivery {
        let mut registry = self.registry();

        let recipients = registry.recipients(audience, &self.supervisor_channel);

        let mut delivery = Delivery::default();
        let mut dropped = Vec::new();

        for id in recipients {
            let Some(sender) = registry.connections.get(&id) else {
                continue;
            };

            match sender.try_send(event.clone()) {
                Ok(()) => delivery.delivered += 1,
                Err(TrySendError::Closed(_)) => dropped.push((id, Dropped::Closed)),
                Err(TrySendError::Full(_)) => dropped.push((id, Dropped::Lagging)),
            }
        }

        delivery.dropped = dropped.len();

        for (id, reason) in dropped {
            registry.remove(id);

            match reason {
                Dropped::Closed => warn!(
                    connection = %id,
                    event = event.name(),
                    "dropping closed connection"
                ),
                Dropped::Lagging => warn!(
                    connection = %id,
                    event = event.name(),
                    capacity = self.queue_capacity.get(),
                    "dropping connection with full queue"
                ),
            }
        }

        delivery
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use super::*;

    fn hint(new_stock: u64) -> StockUpdate {
        StockUpdate::hint(Uuid::nil(), new_stock)
    }

    fn alert() -> LowStockAlert {
        LowStockAlert {
            product_id: Uuid::nil(),
            product_name: "Samsung Galaxy S24".to_string(),
            current_stock: 8,
            safety_stock: 15,
            out_of_stock: false,
            timestamp: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn connect_joins_default_channel() {
        let broadcaster = Broadcaster::default();
        let subscription = broadcaster.connect();

        assert_eq!(broadcaster.members(DEFAULT_CHANNEL), 1);
        assert_eq!(broadcaster.connection_count(), 1);

        broadcaster.disconnect(subscription.id);

        assert_eq!(broadcaster.members(DEFAULT_CHANNEL), 0);
        assert_eq!(broadcaster.connection_count(), 0);
    }

    #[test]
    fn stock_updates_reach_only_default_channel_members() {
        let broadcaster = Broadcaster::default();
        let mut member = broadcaster.connect();
        let mut outsider = broadcaster.connect();

        assert!(broadcaster.leave(outsider.id, DEFAULT_CHANNEL));

        let delivery = broadcaster.publish_stock_update(hint(4));

        assert_eq!(
            delivery,
            Delivery {
                delivered: 1,
                dropped: 0
            }
        );
        assert_eq!(
            member.events.try_recv().ok(),
            Some(ServerEvent::StockUpdate(hint(4)))
        );
        assert!(outsider.events.try_recv().is_err());
    }

    #[test]
    fn alerts_prefer_supervisor_channel() {
        let broadcaster = Broadcaster::default();
        let mut clerk = broadcaster.connect();
        let mut manager = broadcaster.connect();

        assert!(broadcaster.join(manager.id, DEFAULT_SUPERVISOR_CHANNEL));

        let delivery = broadcaster.publish_low_stock_alert(alert());

        assert_eq!(delivery.delivered, 1);
        assert_eq!(
            manager.events.try_recv().ok(),
            Some(ServerEvent::LowStockAlert(alert()))
        );
        assert!(clerk.events.try_recv().is_err());
    }

    #[test]
    fn alerts_fall_back_to_default_channel_without_supervisors() {
        let broadcaster = Broadcaster::new("floor-leads");
        let mut first = broadcaster.connect();
        let mut second = broadcaster.connect();

        let delivery = broadcaster.publish_low_stock_alert(alert());

        assert_eq!(delivery.delivered, 2);
        assert!(first.events.try_recv().is_ok());
        assert!(second.events.try_recv().is_ok());
    }

    #[test]
    fn barcode_scans_reach_everyone() {
        let broadcaster = Broadcaster::default();
        let mut inside = broadcaster.connect();
        let mut outside = broadcaster.connect();

        broadcaster.leave(outside.id, DEFAULT_CHANNEL);

        let scan = BarcodeScan {
            barcode: "IP15-001".to_string(),
            timestamp: Timestamp::UNIX_EPOCH,
        };

        assert_eq!(broadcaster.publish_barcode_scan(scan.clone()).delivered, 2);
        assert_eq!(
            inside.events.try_recv().ok(),
            Some(ServerEvent::BarcodeScan(scan.clone()))
        );
        assert_eq!(
            outside.events.try_recv().ok(),
            Some(ServerEvent::BarcodeScan(scan))
        );
    }

    #[test]
    fn stock_hints_skip_the_sender() {
        let broadcaster = Broadcaster::default();
        let mut sender = broadcaster.connect();
        let mut peer = broadcaster.connect();

        let delivery = broadcaster.relay_stock_hint(sender.id, Uuid::nil(), 9);

        assert_eq!(delivery.delivered, 1);
        assert!(sender.events.try_recv().is_err());
        assert_eq!(
            peer.events.try_recv().ok(),
            Some(ServerEvent::StockUpdate(hint(9)))
        );
    }

    #[test]
    fn late_joiners_do_not_see_earlier_events() {
        let broadcaster = Broadcaster::default();
        let early = broadcaster.connect();

        broadcaster.publish_stock_update(hint(1));

        let mut late = broadcaster.connect();

        assert!(late.events.try_recv().is_err());
        drop(early);
    }

    #[test]
    fn closed_receivers_are_pruned() {
        let broadcaster = Broadcaster::default();
        let live = broadcaster.connect();
        let gone = broadcaster.connect();

        drop(gone.events);

        let delivery = broadcaster.publish_stock_update(hint(2));

        assert_eq!(
            delivery,
            Delivery {
                delivered: 1,
                dropped: 1
            }
        );
        assert_eq!(broadcaster.connection_count(), 1);
        assert_eq!(broadcaster.members(DEFAULT_CHANNEL), 1);
        drop(live);
    }

    #[test]
    fn join_rejects_unknown_connections() {
        let broadcaster = Broadcaster::default();
        let subscription = broadcaster.connect();

        broadcaster.disconnect(subscription.id);

        assert!(!broadcaster.join(subscription.id, "managers"));
        assert!(!broadcaster.leave(subscription.id, DEFAULT_CHANNEL));
    }

    #[tokio::test]
    async fn shutdown_ends_every_stream() {
        let broadcaster = Broadcaster::default();
        let mut subscription = broadcaster.connect();

        assert_eq!(broadcaster.shutdown(), 1);
        assert!(subscription.events.recv().await.is_none());
        assert_eq!(broadcaster.connection_count(), 0);
    }

    #[test]
    fn stalled_connection_is_dropped_once_its_queue_is_full() -> TestResult {
        let capacity = NonZeroUsize::new(4).ok_or("capacity must be non-zero")?;
        let broadcaster = Broadcaster::default().with_queue_capacity(capacity);
        let mut stalled = broadcaster.connect();
        let mut reader = broadcaster.connect();

        for stock in 0..4 {
            let delivery = broadcaster.publish_stock_update(hint(stock));

            assert_eq!(delivery.delivered, 2);
            assert_eq!(
                reader.events.try_recv().ok(),
                Some(ServerEvent::StockUpdate(hint(stock)))
            );
        }

        let delivery = broadcaster.publish_stock_update(hint(4));

        assert_eq!(
            delivery,
            Delivery {
                delivered: 1,
                dropped: 1
            }
        );
        assert_eq!(broadcaster.connection_count(), 1);

        for _ in 0..1_000 {
            broadcaster.publish_stock_update(hint(5));
            assert!(reader.events.try_recv().is_ok());
        }

        let mut queued = 0;

        while stalled.events.try_recv().is_ok() {
            queued += 1;
        }

        assert_eq!(queued, 4, "stalled queue must stay bounded");

        Ok(())
    }

    #[test]
    fn supervisors_outside_default_channel_see_update_before_alert() {
        let broadcaster = Broadcaster::default();
        let mut manager = broadcaster.connect();

        assert!(broadcaster.join(manager.id, DEFAULT_SUPERVISOR_CHANNEL));
        assert!(broadcaster.leave(manager.id, DEFAULT_CHANNEL));

        assert_eq!(broadcaster.publish_stock_update(hint(8)).delivered, 1);
        assert_eq!(broadcaster.publish_low_stock_alert(alert()).delivered, 1);

        assert_eq!(
            manager.events.try_recv().ok(),
            Some(ServerEvent::StockUpdate(hint(8)))
        );
        assert_eq!(
            manager.events.try_recv().ok(),
            Some(ServerEvent::LowStockAlert(alert()))
        );
    }

    #[test]
    fn members_of_both_channels_get_one_stock_update() {
        let broadcaster = Broadcaster::default();
        let mut manager = broadcaster.connect();

        broadcaster.join(manager.id, DEFAULT_SUPERVISOR_CHANNEL);

        assert_eq!(broadcaster.publish_stock_update(hint(3)).delivered, 1);
        assert!(manager.events.try_recv().is_ok());
        assert!(manager.events.try_recv().is_err());
    }

    #[test]
    fn alerts_fall_back_once_the_last_supervisor_leaves() {
        let broadcaster = Broadcaster::default();
        let mut clerk = broadcaster.connect();
        let manager = broadcaster.connect();

        broadcaster.join(manager.id, DEFAULT_SUPERVISOR_CHANNEL);
        broadcaster.leave(manager.id, DEFAULT_SUPERVISOR_CHANNEL);

        assert_eq!(broadcaster.publish_low_stock_alert(alert()).delivered, 2);
        assert_eq!(
            clerk.events.try_recv().ok(),
            Some(ServerEvent::LowStockAlert(alert()))
        );
    }

    #[test]
    fn relayed_alerts_reach_other_supervisors_only() {
        let broadcaster = Broadcaster::default();
        let mut raiser = broadcaster.connect();
        let mut manager = broadcaster.connect();
        let mut clerk = broadcaster.connect();

        broadcaster.join(raiser.id, DEFAULT_SUPERVISOR_CHANNEL);
        broadcaster.join(manager.id, DEFAULT_SUPERVISOR_CHANNEL);

        let delivery = broadcaster.relay_low_stock_alert(raiser.id, alert());

        assert_eq!(delivery.delivered, 1);
        assert!(raiser.events.try_recv().is_err());
        assert!(clerk.events.try_recv().is_err());
        assert_eq!(
            manager.events.try_recv().ok(),
            Some(ServerEvent::LowStockAlert(alert()))
        );
    }

    #[test]
    fn relayed_alerts_without_supervisors_go_nowhere() {
        let broadcaster = Broadcaster::default();
        let raiser = broadcaster.connect();
        let mut clerk = broadcaster.connect();

        assert_eq!(
            broadcaster.relay_low_stock_alert(raiser.id, alert()),
            Delivery::default()
        );
        assert!(clerk.events.try_recv().is_err());
    }
}
