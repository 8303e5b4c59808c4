//! UserMap - Gruppi di notifica per utente
//!
//! Ogni utente ha un gruppo formato dalle sue connessioni WebSocket attive.
//! La mappa è partizionata per user id (`DashMap`), quindi utenti diversi non
//! si contendono mai lo stesso lock.

use crate::dtos::ServerEvent;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument};

pub type ConnectionId = u64;

/// Segnali interni verso il task di scrittura di una connessione
#[derive(Debug, Clone)]
pub enum InternalSignal {
    /// evento da serializzare e inviare al client
    Event(Arc<ServerEvent>),
    Shutdown,
}

pub struct UserMap {
    groups: DashMap<i64, HashMap<ConnectionId, UnboundedSender<InternalSignal>>>,
    next_connection_id: AtomicU64,
}

impl Default for UserMap {
    fn default() -> Self {
        Self::new()
    }
}

impl UserMap {
    pub fn new() -> Self {
        UserMap {
            groups: DashMap::new(),
            next_connection_id: AtomicU64::new(1),
        }
    }

    /// Adds a connection handle to the user's group and returns its id.
    #[instrument(skip(self, tx))]
    pub fn join(&self, user_id: i64, tx: UnboundedSender<InternalSignal>) -> ConnectionId {
        let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        let mut group = self.groups.entry(user_id).or_default();
        group.insert(connection_id, tx);
        info!(
            connection_id,
            connections = group.len(),
            "Connection joined user group"
        );
        connection_id
    }

    /// Removes only the given handle. Returns false if it was not joined.
    #[instrument(skip(self))]
    pub fn leave(&self, user_id: i64, connection_id: ConnectionId) -> bool {
        let removed = match self.groups.get_mut(&user_id) {
            Some(mut group) => group.remove(&connection_id).is_some(),
            None => false,
        };
        // gruppo vuoto: lo togliamo dalla mappa
        self.groups.remove_if(&user_id, |_, group| group.is_empty());
        if removed {
            info!(connection_id, "Connection left user group");
        }
        removed
    }

    /// Delivers `event` to every connection of the user and returns how many were reached.
    ///
    /// Best effort: with no live connection the event is dropped. The shard lock of the
    /// user is held while sending, so concurrent publishes to the same user are delivered
    /// in the same order to every handle.
    #[instrument(skip(self, event))]
    pub fn publish(&self, user_id: i64, event: ServerEvent) -> usize {
        let event = Arc::new(event);
        let delivered = match self.groups.get_mut(&user_id) {
            Some(mut group) => {
                group.retain(|connection_id, tx| {
                    let alive = tx.send(InternalSignal::Event(event.clone())).is_ok();
                    if !alive {
                        debug!(connection_id, "Pruning closed connection");
                    }
                    alive
                });
                group.len()
            }
            None => 0,
        };

        if delivered == 0 {
            self.groups.remove_if(&user_id, |_, group| group.is_empty());
            debug!("User not online, event dropped");
        } else {
            debug!(delivered, "Event published");
        }
        delivered
    }

    /// Number of live connections of a user
    pub fn connection_count(&self, user_id: i64) -> usize {
        self.groups.get(&user_id).map_or(0, |group| group.len())
    }

    /// Get the count of online users
    pub fn online_count(&self) -> usize {
        self.groups.len()
    }

    /// Check if a specific user is online
    pub fn is_user_online(&self, user_id: i64) -> bool {
        self.connection_count(user_id) > 0
    }
}
