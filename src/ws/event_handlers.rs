//! WebSocket Event Handlers - Dispatch dei comandi in ingresso

use crate::core::{AppError, AppState};
use crate::dtos::{ClientEvent, ServerEvent};
use crate::engine::InvitationStateMachine;
use crate::entities::User;
use tracing::{info, instrument, warn};

/// Esegue un comando del client e restituisce l'evento da rimandare alla stessa connessione.
///
/// Un fallimento produce un evento `error` con il codice HTTP equivalente, mai una conferma.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn process_client_event(state: &AppState, user: &User, event: ClientEvent) -> ServerEvent {
    match event {
        ClientEvent::InvitationResponse {
            invitation_id,
            status,
        } => {
            let machine = InvitationStateMachine::new(state);
            match machine
                .respond(invitation_id, status.target_status(), user)
                .await
            {
                Ok(_) => {
                    info!(invitation_id, "Invitation response recorded");
                    ServerEvent::confirmation(invitation_id, status)
                }
                Err(e) => {
                    warn!(invitation_id, "Invitation response rejected: {}", e);
                    let message = e.to_string();
                    let code = AppError::from(e).status().as_u16();
                    ServerEvent::error(Some(invitation_id), code, message)
                }
            }
        }
    }
}
