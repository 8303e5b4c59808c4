//! AnswerRepository - Repository per le risposte di un tentativo

use crate::entities::Answer;
use chrono::Utc;
use sqlx::{Error, SqliteConnection, SqlitePool};

const ANSWER_COLUMNS: &str = "answer_id, attempt_id, question_id, selected_choice_id, answered_at";

pub struct AnswerRepository {
    connection_pool: SqlitePool,
}

impl AnswerRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Inserisce la risposta solo se il tentativo è ancora IN_PROGRESS (`None` altrimenti);
    /// UNIQUE (attempt_id, question_id) rifiuta i duplicati
    pub async fn insert(
        conn: &mut SqliteConnection,
        attempt_id: &i64,
        question_id: &i64,
        selected_choice_id: &i64,
    ) -> Result<Option<Answer>, Error> {
        sqlx::query_as::<_, Answer>(&format!(
            r#"
            INSERT INTO answers (attempt_id, question_id, selected_choice_id, answered_at)
            SELECT ?, ?, ?, ?
            WHERE EXISTS (
                SELECT 1 FROM attempts WHERE attempt_id = ? AND status = 'IN_PROGRESS'
            )
            RETURNING {ANSWER_COLUMNS}
            "#
        ))
        .bind(attempt_id)
        .bind(question_id)
        .bind(selected_choice_id)
        .bind(Utc::now())
        .bind(attempt_id)
        .fetch_optional(conn)
        .await
    }

    pub async fn count_by_attempt(&self, attempt_id: &i64) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM answers WHERE attempt_id = ?")
            .bind(attempt_id)
            .fetch_one(&self.connection_pool)
            .await
    }
}
