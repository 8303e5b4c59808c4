//! Answer entity - Entità risposta

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Answer {
    pub answer_id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    pub selected_choice_id: i64,
    pub answered_at: DateTime<Utc>,
}
