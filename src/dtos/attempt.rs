//! Attempt DTOs - Data Transfer Objects per tentativi e risposte

use crate::entities::{Attempt, AttemptStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AttemptDTO {
    pub attempt_id: i64,
    pub quiz_id: i64,
    pub participant_id: i64,
    pub status: AttemptStatus,
    pub score: i64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Attempt> for AttemptDTO {
    fn from(value: Attempt) -> Self {
        Self {
            attempt_id: value.attempt_id,
            quiz_id: value.quiz_id,
            participant_id: value.participant_id,
            status: value.status,
            score: value.score,
            started_at: value.started_at,
            completed_at: value.completed_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AnswerRequestDTO {
    pub question_id: i64,
    pub choice_id: i64,
}

/// Body di `POST /attempts/{attempt_id}/answers`
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct SubmitAnswersDTO {
    #[validate(length(min = 1))]
    pub answers: Vec<AnswerRequestDTO>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AttemptProgressDTO {
    pub attempt_id: i64,
    pub status: AttemptStatus,
    pub score: i64,
    pub max_score: i64,
    pub percentage_score: f64,
    pub answered_questions: i64,
    pub total_questions: i64,
}
