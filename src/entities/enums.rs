//! Enumerazioni - Tipi enumerati utilizzati nelle entità

use serde::{Deserialize, Serialize};

// ********************* ENUMERAZIONI UTILI **********************//

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
pub enum QuizStatus {
    Draft,
    Active,
    Closed,
}

/// Tipo di domanda. Per ora esiste solo la scelta multipla.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InvitationStatus {
    /// Human readable label, used in notifications ("Accepted", "Declined", ...)
    pub fn label(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "Pending",
            InvitationStatus::Accepted => "Accepted",
            InvitationStatus::Declined => "Declined",
            InvitationStatus::Expired => "Expired",
        }
    }

    /// Terminal states allow no further transition
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InvitationStatus::Pending)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    InProgress,
    Completed,
    Expired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_is_not_terminal() {
        assert!(!InvitationStatus::Pending.is_terminal());
        assert!(InvitationStatus::Accepted.is_terminal());
        assert!(InvitationStatus::Declined.is_terminal());
        assert!(InvitationStatus::Expired.is_terminal());
    }

    #[test]
    fn labels_match_variant_names() {
        assert_eq!(InvitationStatus::Accepted.label(), "Accepted");
        assert_eq!(InvitationStatus::Declined.label().to_lowercase(), "declined");
    }
}
