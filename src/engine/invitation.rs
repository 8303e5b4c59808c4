//! Invitation State Machine
//!
//! Pending -> Accepted | Declined (risposta del partecipante)
//! Pending -> Expired (quiz chiuso o finito)
//!
//! Ogni transizione terminale notifica chi ha invitato. Le notifiche partono solo
//! dopo il commit della transazione.

use crate::core::{AppState, CoreError};
use crate::dtos::{CreateInvitationDTO, ServerEvent};
use crate::entities::{Invitation, InvitationStatus, Quiz, User};
use crate::repositories::{AttemptRepository, Create, InvitationRepository, Read};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

pub struct InvitationStateMachine<'a> {
    state: &'a AppState,
}

impl<'a> InvitationStateMachine<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Creates a Pending invitation and notifies the participant.
    #[instrument(skip_all, fields(quiz_id = %quiz.quiz_id, participant_id = %participant.user_id))]
    pub async fn invite(
        &self,
        quiz: &Quiz,
        participant: &User,
        invited_by: &User,
    ) -> Result<Invitation, CoreError> {
        let invitation = self
            .state
            .invitation
            .create(&CreateInvitationDTO {
                quiz_id: quiz.quiz_id,
                participant_id: participant.user_id,
                invited_by_id: invited_by.user_id,
            })
            .await?;
        info!(invitation_id = invitation.invitation_id, "Invitation created");

        let inviter = invited_by.display_label().to_string();
        let event = ServerEvent::Invitation {
            invitation_id: invitation.invitation_id,
            quiz_id: quiz.quiz_id,
            quiz_title: quiz.title.clone(),
            message: format!(
                "You have been invited to take the quiz: {} by {}",
                quiz.title, inviter
            ),
            inviter,
        };
        self.state.users_online.publish(participant.user_id, event);

        Ok(invitation)
    }

    /// Applies the participant's answer to a pending invitation.
    ///
    /// On `Accepted` the in-progress attempt for (quiz, participant) is opened in the same
    /// transaction as the status change.
    #[instrument(skip(self, responding_user), fields(user_id = %responding_user.user_id))]
    pub async fn respond(
        &self,
        invitation_id: i64,
        new_status: InvitationStatus,
        responding_user: &User,
    ) -> Result<Invitation, CoreError> {
        let invitation = self
            .state
            .invitation
            .read(&invitation_id)
            .await?
            .ok_or(CoreError::NotFound("invitation"))?;

        if invitation.participant_id != responding_user.user_id {
            warn!("User is not the participant of the invitation");
            return Err(CoreError::Forbidden(
                "You can only respond to your own invitations",
            ));
        }

        let legal_target = matches!(
            new_status,
            InvitationStatus::Accepted | InvitationStatus::Declined
        );
        if invitation.status.is_terminal() || !legal_target {
            return Err(CoreError::InvalidTransition {
                from: invitation.status,
                to: new_status,
            });
        }

        let quiz = self
            .state
            .quiz
            .read(&invitation.quiz_id)
            .await?
            .ok_or(CoreError::NotFound("quiz"))?;

        let mut tx = self.state.pool.begin().await?;

        let moved = InvitationRepository::transition_from_pending(
            &mut *tx,
            &invitation_id,
            new_status,
            Utc::now(),
        )
        .await?;

        if !moved {
            // un'altra risposta è arrivata prima di noi
            let current = InvitationRepository::read_with(&mut *tx, &invitation_id)
                .await?
                .ok_or(CoreError::NotFound("invitation"))?;
            tx.rollback().await?;
            debug!(from = ?current.status, "Lost the race on the invitation status");
            return Err(CoreError::InvalidTransition {
                from: current.status,
                to: new_status,
            });
        }

        if new_status == InvitationStatus::Accepted {
            let attempt = AttemptRepository::open_in_progress(
                &mut *tx,
                &invitation.quiz_id,
                &invitation.participant_id,
            )
            .await?;
            info!(attempt_id = attempt.attempt_id, "Attempt opened on acceptance");
        }

        let updated = InvitationRepository::read_with(&mut *tx, &invitation_id)
            .await?
            .ok_or(CoreError::NotFound("invitation"))?;
        tx.commit().await?;

        info!(status = ?updated.status, "Invitation answered");
        self.notify_inviter(&updated, &quiz, responding_user.display_label());
        Ok(updated)
    }

    /// Pending -> Expired. Notifies the inviter like any other terminal transition.
    #[instrument(skip(self))]
    pub async fn expire(&self, invitation_id: i64) -> Result<Invitation, CoreError> {
        let invitation = self
            .state
            .invitation
            .read(&invitation_id)
            .await?
            .ok_or(CoreError::NotFound("invitation"))?;

        if invitation.status.is_terminal() {
            return Err(CoreError::InvalidTransition {
                from: invitation.status,
                to: InvitationStatus::Expired,
            });
        }

        let quiz = self
            .state
            .quiz
            .read(&invitation.quiz_id)
            .await?
            .ok_or(CoreError::NotFound("quiz"))?;
        let participant = self
            .state
            .user
            .read(&invitation.participant_id)
            .await?
            .ok_or(CoreError::NotFound("user"))?;

        let mut tx = self.state.pool.begin().await?;

        let moved = InvitationRepository::transition_from_pending(
            &mut *tx,
            &invitation_id,
            InvitationStatus::Expired,
            Utc::now(),
        )
        .await?;

        let updated = InvitationRepository::read_with(&mut *tx, &invitation_id)
            .await?
            .ok_or(CoreError::NotFound("invitation"))?;

        if !moved {
            tx.rollback().await?;
            return Err(CoreError::InvalidTransition {
                from: updated.status,
                to: InvitationStatus::Expired,
            });
        }
        tx.commit().await?;

        self.notify_inviter(&updated, &quiz, participant.display_label());
        Ok(updated)
    }

    /// Expires every pending invitation of a closed quiz or of a quiz whose window is over.
    /// Returns the number of invitations expired.
    #[instrument(skip(self))]
    pub async fn expire_ended(&self) -> Result<usize, CoreError> {
        let now = Utc::now();
        let ended = self
            .state
            .quiz
            .find_many_with_pending_invitations()
            .await?
            .into_iter()
            .filter(|quiz| quiz.has_ended_at(now));

        let mut expired = 0;
        for quiz in ended {
            for invitation in self.state.invitation.find_pending_for_quiz(&quiz.quiz_id).await? {
                match self.expire(invitation.invitation_id).await {
                    Ok(_) => expired += 1,
                    // il partecipante ha risposto nel frattempo
                    Err(CoreError::InvalidTransition { .. }) => {}
                    Err(e) => warn!(
                        invitation_id = invitation.invitation_id,
                        "Failed to expire invitation: {}", e
                    ),
                }
            }
        }

        if expired > 0 {
            info!(expired, "Expired pending invitations of ended quizzes");
        }
        Ok(expired)
    }

    /// Dopo il commit: la transizione è già salvata, la notifica è best effort.
    fn notify_inviter(&self, invitation: &Invitation, quiz: &Quiz, participant: &str) {
        let status = invitation.status.label();
        let event = ServerEvent::InvitationResponse {
            invitation_id: invitation.invitation_id,
            quiz_id: quiz.quiz_id,
            quiz_title: quiz.title.clone(),
            participant: participant.to_string(),
            status: status.to_string(),
            message: format!(
                "{} has {} your invitation to {}",
                participant,
                status.to_lowercase(),
                quiz.title
            ),
        };
        let reached = self
            .state
            .users_online
            .publish(invitation.invited_by_id, event);
        if reached == 0 {
            debug!(invited_by = invitation.invited_by_id, "Inviter is offline, event dropped");
        }
    }
}
