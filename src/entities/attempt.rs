//! Attempt entity - Entità tentativo di un quiz

use super::enums::AttemptStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Attempt {
    pub attempt_id: i64,
    pub quiz_id: i64,
    pub participant_id: i64,
    pub status: AttemptStatus,
    /// accumulatore, cresce solo mentre il tentativo è in corso
    pub score: i64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Attempt {
    pub fn percentage_score(&self, max_score: i64) -> f64 {
        percentage_score(self.score, max_score)
    }
}

/// `score / max_score * 100` rounded to 2 decimals, 0 when the quiz has no points
pub fn percentage_score(score: i64, max_score: i64) -> f64 {
    if max_score <= 0 {
        return 0.0;
    }
    let raw = score as f64 / max_score as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}
