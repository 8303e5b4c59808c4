//! Choice entity - Entità scelta di una domanda

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Choice {
    pub choice_id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
    pub order: i64,
}
