//! WebSocket Module - Gateway per le notifiche in tempo reale
//!
//! - upgrade HTTP -> WebSocket, autenticato con il token in query string
//! - task di lettura e scrittura per ogni connessione
//! - dispatch dei comandi del client verso la macchina a stati degli inviti

pub mod connection;
pub mod event_handlers;
pub mod usermap;

pub use connection::handle_socket;
pub use usermap::{ConnectionId, InternalSignal, UserMap};

use crate::core::{AppError, AppState, resolve_token};
use axum::{
    extract::{Query, State, ws::WebSocketUpgrade},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Chiusura della connessione dopo questo periodo senza frame in ingresso
pub const TIMEOUT_DURATION_SECONDS: u64 = 300;
/// Intervallo tra i ping inviati dal server
pub const HEARTBEAT_INTERVAL_SECONDS: u64 = 30;
/// Distanza minima tra due comandi dello stesso client
pub const RATE_LIMITER_MILLIS: u64 = 10;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// Entry point per le richieste di upgrade WebSocket.
/// Il token viene verificato prima dell'upgrade: senza un utente valido la
/// connessione non viene mai aperta (401).
#[instrument(skip_all)]
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<WsQuery>,
) -> Result<Response, AppError> {
    let current_user = resolve_token(&state, query.token.as_deref()).await?;
    info!(user_id = current_user.user_id, "Upgrading connection");

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, current_user)))
}
