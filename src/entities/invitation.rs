//! Invitation entity - Entità invito

use super::enums::InvitationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Invitation {
    pub invitation_id: i64,
    pub quiz_id: i64,
    pub participant_id: i64, // utente invitato
    pub invited_by_id: i64,  // utente che invita
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    // valorizzato solo con una transizione terminale
    pub responded_at: Option<DateTime<Utc>>,
}
