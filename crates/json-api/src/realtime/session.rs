//! Client Event Dispatch

use tracing::{debug, info};

use stocksync_app::realtime::{Broadcaster, ClientEvent, ConnectionId, Delivery};

/// What a client event did to the registry or the other connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Dispatched {
    Relayed(Delivery),
    Joined { room: String, changed: bool },
    Left { room: String, changed: bool },
}

/// Apply one inbound event on behalf of `connection`.
///
/// Stock hints and client-raised alerts are relayed without touching persisted state.
pub(crate) fn handle_client_event(
    broadcaster: &Broadcaster,
    connection: ConnectionId,
    event: ClientEvent,
) -> Dispatched {
    match event {
        ClientEvent::UpdateStock {
            product_id,
            new_stock,
        } => {
            debug!(%connection, %product_id, new_stock, "relaying stock hint");

            Dispatched::Relayed(broadcaster.relay_stock_hint(connection, product_id, new_stock))
        }
        ClientEvent::BarcodeScan(scan) => {
            info!(%connection, barcode = %scan.barcode, "barcode scanned");

            Dispatched::Relayed(broadcaster.publish_barcode_scan(scan))
        }
        ClientEvent::LowStockAlert(alert) => {
            info!(
                %connection,
                product = %alert.product_id,
                current_stock = alert.current_stock,
                "client raised low stock alert"
            );

            Dispatched::Relayed(broadcaster.relay_low_stock_alert(connection, alert))
        }
        ClientEvent::JoinRoom { room } => {
            let changed = broadcaster.join(connection, &room);

            debug!(%connection, %room, changed, "joined room");

            Dispatched::Joined { room, changed }
        }
        ClientEvent::LeaveRoom { room } => {
            let changed = broadcaster.leave(connection, &room);

            debug!(%connection, %room, changed, "left room");

            Dispatched::Left { room, changed }
        }
    }
}
