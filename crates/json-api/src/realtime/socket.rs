//! WebSocket Handler

use futures::{SinkExt, StreamExt};
use salvo::{
    prelude::*,
    websocket::{Message, WebSocket, WebSocketUpgrade},
};
use tracing::{debug, info, warn};

use stocksync_app::realtime::{Broadcaster, ClientEvent, ServerEvent};

use crate::{extensions::*, observability::metrics, realtime::session::handle_client_event};

/// Upgrade the request and run a dashboard session until either side goes away.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), StatusError> {
    let broadcaster = depot.state_or_500()?.app.broadcaster.clone();

    WebSocketUpgrade::new()
        .upgrade(req, res, move |socket| run_session(socket, broadcaster))
        .await
}

async fn run_session(socket: WebSocket, broadcaster: Broadcaster) {
    let _connection_gauge = metrics::track_ws_connection();

    let mut subscription = broadcaster.connect();
    let connection = subscription.id;
    let (mut outbound, mut inbound) = socket.split();

    info!(%connection, "client connected");

    let forwarder = tokio::spawn(async move {
        while let Some(event) = subscription.events.recv().await {
            let Some(frame) = encode(&event) else {
                continue;
            };

            if let Err(error) = outbound.send(frame).await {
                debug!(%connection, "outbound frame failed: {error}");

                break;
            }
        }

        if let Err(error) = outbound.close().await {
            debug!(%connection, "close failed: {error}");
        }
    });

    while let Some(frame) = inbound.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(error) => {
                debug!(%connection, "inbound frame failed: {error}");

                break;
            }
        };

        if message.is_close() {
            break;
        }

        if !message.is_text() {
            continue;
        }

        match serde_json::from_slice::<ClientEvent>(message.as_bytes()) {
            Ok(event) => {
                handle_client_event(&broadcaster, connection, event);
            }
            Err(error) => debug!(%connection, "ignoring malformed client event: {error}"),
        }
    }

    broadcaster.disconnect(connection);

    if let Err(error) = forwarder.await {
        warn!(%connection, "forwarder task failed: {error}");
    }

    info!(%connection, "client disconnected");
}

fn encode(event: &ServerEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::text(json)),
        Err(error) => {
            warn!(event = event.name(), "failed to encode event: {error}");

            None
        }
    }
}
