//! ChoiceRepository - Repository per le scelte delle domande

use super::Read;
use crate::dtos::CreateChoiceDTO;
use crate::entities::Choice;
use sqlx::{Error, SqliteConnection, SqlitePool};

const CHOICE_COLUMNS: &str = r#"choice_id, question_id, text, is_correct, "order""#;

pub struct ChoiceRepository {
    connection_pool: SqlitePool,
}

impl ChoiceRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Inserisce una scelta usando la connessione (o transazione) fornita
    pub async fn insert(
        conn: &mut SqliteConnection,
        question_id: &i64,
        data: &CreateChoiceDTO,
    ) -> Result<Choice, Error> {
        sqlx::query_as::<_, Choice>(&format!(
            r#"
            INSERT INTO choices (question_id, text, is_correct, "order")
            VALUES (?, ?, ?, ?)
            RETURNING {CHOICE_COLUMNS}
            "#
        ))
        .bind(question_id)
        .bind(&data.text)
        .bind(data.is_correct)
        .bind(data.order)
        .fetch_one(conn)
        .await
    }

    pub async fn find_many_by_question(&self, question_id: &i64) -> Result<Vec<Choice>, Error> {
        sqlx::query_as::<_, Choice>(&format!(
            r#"SELECT {CHOICE_COLUMNS} FROM choices WHERE question_id = ? ORDER BY "order""#
        ))
        .bind(question_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Tutte le scelte di tutte le domande del quiz (una sola query)
    pub async fn find_many_by_quiz(&self, quiz_id: &i64) -> Result<Vec<Choice>, Error> {
        sqlx::query_as::<_, Choice>(
            r#"
            SELECT c.choice_id, c.question_id, c.text, c.is_correct, c."order"
            FROM choices c
            JOIN questions q ON q.question_id = c.question_id
            WHERE q.quiz_id = ?
            ORDER BY q."order", c."order"
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Read<Choice, i64> for ChoiceRepository {
    async fn read(&self, id: &i64) -> Result<Option<Choice>, Error> {
        sqlx::query_as::<_, Choice>(&format!(
            "SELECT {CHOICE_COLUMNS} FROM choices WHERE choice_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}
