//! WebSocket Connection Management - Gestione connessioni WebSocket

use crate::ws::{HEARTBEAT_INTERVAL_SECONDS, RATE_LIMITER_MILLIS, TIMEOUT_DURATION_SECONDS};
use crate::{
    core::AppState,
    dtos::{ClientEvent, ServerEvent},
    entities::User,
    ws::{event_handlers::process_client_event, usermap::ConnectionId, usermap::InternalSignal},
};
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::{Duration, MissedTickBehavior, interval, timeout};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info, instrument, warn};

/// Appartenenza della connessione al gruppo dell'utente.
/// Il drop (fine del task, errore, panic) esegue sempre il leave.
struct GroupMembership {
    state: Arc<AppState>,
    user_id: i64,
    connection_id: ConnectionId,
}

impl Drop for GroupMembership {
    fn drop(&mut self) {
        self.state
            .users_online
            .leave(self.user_id, self.connection_id);
    }
}

#[instrument(skip(ws, state, user), fields(user_id = %user.user_id))]
pub async fn handle_socket(ws: WebSocket, state: Arc<AppState>, user: User) {
    info!("WebSocket connection established");

    // Dividiamo il WebSocket in due metà: sender e receiver
    let (ws_tx, ws_rx) = ws.split();

    // canale interno: riceve gli eventi del gruppo e le risposte ai comandi
    let (int_tx, int_rx) = unbounded_channel::<InternalSignal>();

    let connection_id = state.users_online.join(user.user_id, int_tx.clone());
    let membership = GroupMembership {
        state: state.clone(),
        user_id: user.user_id,
        connection_id,
    };

    tokio::spawn(write_ws(connection_id, ws_tx, int_rx));
    tokio::spawn(listen_ws(user, ws_rx, int_tx, state, membership));
}

#[instrument(skip(websocket_tx, internal_rx))]
pub async fn write_ws(
    connection_id: ConnectionId,
    mut websocket_tx: SplitSink<WebSocket, Message>,
    internal_rx: UnboundedReceiver<InternalSignal>,
) {
    info!("Write task started");

    let mut signals = UnboundedReceiverStream::new(internal_rx);
    let mut heartbeat = interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECONDS));
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    heartbeat.tick().await; // Consuma primo tick immediato

    loop {
        tokio::select! {
            signal = signals.next() => {
                match signal {
                    Some(InternalSignal::Event(event)) => {
                        let json = match serde_json::to_string(event.as_ref()) {
                            Ok(json) => json,
                            Err(e) => {
                                error!("Failed to serialize event: {:?}", e);
                                continue;
                            }
                        };
                        if let Err(e) = websocket_tx.send(Message::Text(json.into())).await {
                            warn!("Failed to send event, closing connection: {:?}", e);
                            break;
                        }
                    }
                    Some(InternalSignal::Shutdown) => {
                        info!("Shutdown signal received");
                        break;
                    }
                    None => {
                        info!("Internal channel closed");
                        break;
                    }
                }
            }

            _ = heartbeat.tick() => {
                if websocket_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    warn!("Heartbeat failed, closing connection");
                    break;
                }
            }
        }
    }

    let _ = websocket_tx.close().await;
    info!("Write task terminated");
}

#[instrument(skip(user, websocket_rx, internal_tx, state, membership), fields(user_id = %user.user_id))]
async fn listen_ws(
    user: User,
    mut websocket_rx: SplitStream<WebSocket>,
    internal_tx: UnboundedSender<InternalSignal>,
    state: Arc<AppState>,
    membership: GroupMembership,
) {
    info!("Listen task started");

    let mut rate_limiter = interval(Duration::from_millis(RATE_LIMITER_MILLIS));
    let timeout_duration = Duration::from_secs(TIMEOUT_DURATION_SECONDS);

    loop {
        match timeout(timeout_duration, websocket_rx.next()).await {
            Ok(Some(msg_result)) => {
                let msg = match msg_result {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("WebSocket error: {:?}", e);
                        break;
                    }
                };

                match msg {
                    Message::Text(text) => {
                        rate_limiter.tick().await;
                        let reply = match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => process_client_event(&state, &user, event).await,
                            Err(e) => {
                                warn!("Failed to deserialize client event: {}", e);
                                ServerEvent::error(None, 400, "Malformed message")
                            }
                        };
                        if internal_tx.send(InternalSignal::Event(Arc::new(reply))).is_err() {
                            debug!("Writer gone, stopping listener");
                            break;
                        }
                    }
                    Message::Close(_) => {
                        info!("Close message received");
                        break;
                    }
                    _ => {}
                }
            }
            Ok(None) => {
                info!("WebSocket stream ended");
                break;
            }
            Err(_) => {
                warn!(
                    timeout_secs = TIMEOUT_DURATION_SECONDS,
                    "Connection timeout"
                );
                break;
            }
        }
    }

    // Cleanup: prima si esce dal gruppo, poi si ferma il writer
    drop(membership);
    let _ = internal_tx.send(InternalSignal::Shutdown);
    info!("Listen task terminated");
}
