//! QuizRepository - Repository per la gestione dei quiz

use super::{Delete, Read, Update};
use crate::dtos::{CreateQuizDTO, UpdateQuizDTO};
use crate::entities::{Quiz, QuizStatus};
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::instrument;

pub(crate) const QUIZ_COLUMNS: &str =
    "quiz_id, title, description, owner_id, status, start_time, end_time, created_at";

pub struct QuizRepository {
    connection_pool: SqlitePool,
}

impl QuizRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Crea un quiz di proprietà di `owner_id`
    #[instrument(skip(self, data), fields(title = %data.title))]
    pub async fn create_for_owner(&self, owner_id: i64, data: &CreateQuizDTO) -> Result<Quiz, Error> {
        sqlx::query_as::<_, Quiz>(&format!(
            r#"
            INSERT INTO quizzes (title, description, owner_id, status, start_time, end_time, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {QUIZ_COLUMNS}
            "#
        ))
        .bind(&data.title)
        .bind(data.description.as_deref().unwrap_or_default())
        .bind(owner_id)
        .bind(data.status.unwrap_or(QuizStatus::Draft))
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await
    }

    /// Quiz creati da un utente
    pub async fn find_many_by_owner(&self, owner_id: &i64) -> Result<Vec<Quiz>, Error> {
        sqlx::query_as::<_, Quiz>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE owner_id = ? ORDER BY created_at DESC, quiz_id DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Quiz giocabili da un partecipante: quelli per cui ha almeno un tentativo
    pub async fn find_many_by_participant(&self, participant_id: &i64) -> Result<Vec<Quiz>, Error> {
        sqlx::query_as::<_, Quiz>(
            r#"
            SELECT DISTINCT q.quiz_id, q.title, q.description, q.owner_id, q.status,
                   q.start_time, q.end_time, q.created_at
            FROM quizzes q
            JOIN attempts a ON a.quiz_id = q.quiz_id
            WHERE a.participant_id = ?
            ORDER BY q.quiz_id
            "#,
        )
        .bind(participant_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// True if the participant holds at least one attempt for the quiz
    pub async fn is_playable_by(&self, quiz_id: &i64, participant_id: &i64) -> Result<bool, Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM attempts WHERE quiz_id = ? AND participant_id = ?",
        )
        .bind(quiz_id)
        .bind(participant_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(count > 0)
    }

    /// Quiz che hanno ancora inviti in attesa
    pub async fn find_many_with_pending_invitations(&self) -> Result<Vec<Quiz>, Error> {
        sqlx::query_as::<_, Quiz>(
            r#"
            SELECT DISTINCT q.quiz_id, q.title, q.description, q.owner_id, q.status,
                   q.start_time, q.end_time, q.created_at
            FROM quizzes q
            JOIN invitations i ON i.quiz_id = q.quiz_id
            WHERE i.status = 'PENDING'
            "#,
        )
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Sum of the points of every question of the quiz, 0 when it has none
    pub async fn max_score(&self, quiz_id: &i64) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(points), 0) FROM questions WHERE quiz_id = ?")
            .bind(quiz_id)
            .fetch_one(&self.connection_pool)
            .await
    }

    pub async fn total_questions(&self, quiz_id: &i64) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE quiz_id = ?")
            .bind(quiz_id)
            .fetch_one(&self.connection_pool)
            .await
    }
}

impl Read<Quiz, i64> for QuizRepository {
    async fn read(&self, id: &i64) -> Result<Option<Quiz>, Error> {
        sqlx::query_as::<_, Quiz>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE quiz_id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Quiz, UpdateQuizDTO, i64> for QuizRepository {
    #[instrument(skip(self, data), fields(quiz_id = %id))]
    async fn update(&self, id: &i64, data: &UpdateQuizDTO) -> Result<Quiz, Error> {
        // First, get the current quiz to ensure it exists
        let current_quiz = self.read(id).await?.ok_or(sqlx::Error::RowNotFound)?;

        if data.is_empty() {
            return Ok(current_quiz);
        }

        // Build dynamic UPDATE query using QueryBuilder (idiomatic SQLx way)
        let mut query_builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new("UPDATE quizzes SET ");
        let mut separated = query_builder.separated(", ");
        if let Some(ref title) = data.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title.clone());
        }
        if let Some(ref description) = data.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }
        if let Some(status) = data.status {
            separated.push("status = ");
            separated.push_bind_unseparated(status);
        }
        if let Some(start_time) = data.start_time {
            separated.push("start_time = ");
            separated.push_bind_unseparated(start_time);
        }
        if let Some(end_time) = data.end_time {
            separated.push("end_time = ");
            separated.push_bind_unseparated(end_time);
        }

        query_builder.push(" WHERE quiz_id = ");
        query_builder.push_bind(*id);

        query_builder.build().execute(&self.connection_pool).await?;

        // Fetch and return the updated quiz
        self.read(id).await?.ok_or(sqlx::Error::RowNotFound)
    }
}

impl Delete<i64> for QuizRepository {
    #[instrument(skip(self))]
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM quizzes WHERE quiz_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }
}
