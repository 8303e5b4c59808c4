//! InvitationRepository - Repository per la gestione degli inviti

use super::{Create, Read};
use crate::dtos::CreateInvitationDTO;
use crate::entities::{Invitation, InvitationStatus};
use chrono::{DateTime, Utc};
use sqlx::{Error, SqliteConnection, SqlitePool};
use tracing::instrument;

const INVITATION_COLUMNS: &str =
    "invitation_id, quiz_id, participant_id, invited_by_id, status, created_at, responded_at";

//INVITATION REPOSITORY
pub struct InvitationRepository {
    connection_pool: SqlitePool,
}

impl InvitationRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Get all pending invitations for a specific user
    pub async fn find_pending_for_user(&self, user_id: &i64) -> Result<Vec<Invitation>, Error> {
        sqlx::query_as::<_, Invitation>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM invitations
            WHERE participant_id = ? AND status = 'PENDING'
            ORDER BY created_at, invitation_id
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Pending invitations of a quiz
    pub async fn find_pending_for_quiz(&self, quiz_id: &i64) -> Result<Vec<Invitation>, Error> {
        sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE quiz_id = ? AND status = 'PENDING'"
        ))
        .bind(quiz_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Compare-and-set dello stato: passa a `to` solo se l'invito è ancora PENDING.
    ///
    /// Returns `false` when another transition won the race (or the row is gone).
    #[instrument(skip(conn))]
    pub async fn transition_from_pending(
        conn: &mut SqliteConnection,
        invitation_id: &i64,
        to: InvitationStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET status = ?, responded_at = ?
            WHERE invitation_id = ? AND status = 'PENDING'
            "#,
        )
        .bind(to)
        .bind(responded_at)
        .bind(invitation_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Lettura dentro una transazione già aperta
    pub async fn read_with(
        conn: &mut SqliteConnection,
        invitation_id: &i64,
    ) -> Result<Option<Invitation>, Error> {
        sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE invitation_id = ?"
        ))
        .bind(invitation_id)
        .fetch_optional(conn)
        .await
    }
}

impl Create<Invitation, CreateInvitationDTO> for InvitationRepository {
    #[instrument(skip(self, data), fields(quiz_id = %data.quiz_id, participant_id = %data.participant_id))]
    async fn create(&self, data: &CreateInvitationDTO) -> Result<Invitation, Error> {
        // lo stato iniziale è sempre PENDING, responded_at resta NULL
        sqlx::query_as::<_, Invitation>(&format!(
            r#"
            INSERT INTO invitations (quiz_id, participant_id, invited_by_id, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(data.quiz_id)
        .bind(data.participant_id)
        .bind(data.invited_by_id)
        .bind(InvitationStatus::Pending)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Invitation, i64> for InvitationRepository {
    async fn read(&self, id: &i64) -> Result<Option<Invitation>, Error> {
        let mut conn = self.connection_pool.acquire().await?;
        Self::read_with(&mut *conn, id).await
    }
}
