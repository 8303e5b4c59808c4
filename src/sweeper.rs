//! Sweeper - Task periodico che fa scadere gli inviti dei quiz terminati

use crate::core::AppState;
use crate::engine::InvitationStateMachine;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

/// Avvia il task in background. Ad ogni tick gli inviti ancora Pending di quiz chiusi
/// o con `end_time` passato diventano Expired e chi ha invitato viene notificato.
pub fn start_invitation_sweeper(state: Arc<AppState>, interval_secs: u64) -> JoinHandle<()> {
    info!(interval_secs, "Starting invitation sweeper");

    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match InvitationStateMachine::new(&state).expire_ended().await {
                Ok(0) => debug!("No invitation to expire"),
                Ok(expired) => info!(expired, "Invitation sweep completed"),
                Err(e) => error!("Invitation sweep failed: {}", e),
            }
        }
    })
}
