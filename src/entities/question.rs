//! Question entity - Entità domanda

use super::enums::QuestionType;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Question {
    pub question_id: i64,
    pub quiz_id: i64,
    pub text: String,
    pub question_type: QuestionType,
    // unico all'interno del quiz
    pub order: i64,
    pub points: i64,
}
