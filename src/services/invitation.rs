//! Invitation services - Inviti in attesa e risposta via HTTP
//!
//! La risposta via HTTP è un'alternativa al comando WebSocket `invitation_response`
//! e passa dalla stessa macchina a stati.

use crate::core::{AppError, AppState};
use crate::dtos::{InvitationDTO, ResponseAction};
use crate::engine::InvitationStateMachine;
use crate::entities::User;
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_pending_invitations(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<InvitationDTO>>, AppError> {
    let invitations = state
        .invitation
        .find_pending_for_user(&current_user.user_id)
        .await?;
    debug!("Found {} pending invitations", invitations.len());
    Ok(Json(invitations.into_iter().map(InvitationDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn respond_to_invitation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path((invitation_id, action)): Path<(i64, String)>,
) -> Result<Json<InvitationDTO>, AppError> {
    let action = ResponseAction::from_path(&action)
        .ok_or_else(|| AppError::bad_request("Action must be accept or decline"))?;

    let invitation = InvitationStateMachine::new(&state)
        .respond(invitation_id, action.target_status(), &current_user)
        .await?;

    Ok(Json(InvitationDTO::from(invitation)))
}
