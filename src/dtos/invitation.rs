//! Invitation DTOs - Data Transfer Objects per inviti

use crate::entities::{Invitation, InvitationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InvitationDTO {
    pub invitation_id: i64,
    pub quiz_id: i64,
    pub participant_id: i64,
    pub invited_by_id: i64,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl From<Invitation> for InvitationDTO {
    fn from(value: Invitation) -> Self {
        Self {
            invitation_id: value.invitation_id,
            quiz_id: value.quiz_id,
            participant_id: value.participant_id,
            invited_by_id: value.invited_by_id,
            status: value.status,
            created_at: value.created_at,
            responded_at: value.responded_at,
        }
    }
}

/// DTO per creare un nuovo invito (lo stato parte sempre da Pending)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateInvitationDTO {
    pub quiz_id: i64,
    pub participant_id: i64,
    pub invited_by_id: i64,
}

/// Body di `POST /quizzes/creator/{quiz_id}/invite`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InviteRequestDTO {
    pub participant_id: i64,
}
