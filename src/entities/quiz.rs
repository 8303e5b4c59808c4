//! Quiz entity - Entità quiz

use super::enums::QuizStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Quiz {
    pub quiz_id: i64,
    pub title: String,
    pub description: String,
    pub owner_id: i64,
    pub status: QuizStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    /// A quiz is playable when it is Active and `now` falls in `[start_time, end_time)`.
    /// Missing bounds are open.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        if self.status != QuizStatus::Active {
            return false;
        }
        let started = self.start_time.is_none_or(|start| now >= start);
        let not_ended = self.end_time.is_none_or(|end| now < end);
        started && not_ended
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// True once the quiz can no longer be taken: closed, or its window is over
    pub fn has_ended_at(&self, now: DateTime<Utc>) -> bool {
        self.status == QuizStatus::Closed || self.end_time.is_some_and(|end| now >= end)
    }
}
