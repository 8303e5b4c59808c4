//! QuestionRepository - Repository per le domande di un quiz

use super::Read;
use super::choice::ChoiceRepository;
use crate::dtos::CreateQuestionDTO;
use crate::entities::{Choice, Question};
use sqlx::{Error, SqlitePool};
use tracing::{debug, instrument};

const QUESTION_COLUMNS: &str = r#"question_id, quiz_id, text, question_type, "order", points"#;

pub struct QuestionRepository {
    connection_pool: SqlitePool,
}

impl QuestionRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Inserts the question and all of its choices in one transaction.
    /// A duplicate order or a second correct choice rolls back everything.
    #[instrument(skip(self, data), fields(quiz_id = %quiz_id, order = %data.order))]
    pub async fn create_with_choices(
        &self,
        quiz_id: &i64,
        data: &CreateQuestionDTO,
    ) -> Result<(Question, Vec<Choice>), Error> {
        let mut tx = self.connection_pool.begin().await?;

        let question = sqlx::query_as::<_, Question>(&format!(
            r#"
            INSERT INTO questions (quiz_id, text, question_type, "order", points)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {QUESTION_COLUMNS}
            "#
        ))
        .bind(quiz_id)
        .bind(&data.text)
        .bind(data.question_type.unwrap_or_default())
        .bind(data.order)
        .bind(data.points.unwrap_or(1))
        .fetch_one(&mut *tx)
        .await?;

        let mut choices = Vec::with_capacity(data.choices.len());
        for choice in &data.choices {
            choices.push(ChoiceRepository::insert(&mut *tx, &question.question_id, choice).await?);
        }

        tx.commit().await?;
        debug!(
            "Question {} created with {} choices",
            question.question_id,
            choices.len()
        );
        Ok((question, choices))
    }

    /// Domande del quiz ordinate per `order`
    pub async fn find_many_by_quiz(&self, quiz_id: &i64) -> Result<Vec<Question>, Error> {
        sqlx::query_as::<_, Question>(&format!(
            r#"SELECT {QUESTION_COLUMNS} FROM questions WHERE quiz_id = ? ORDER BY "order""#
        ))
        .bind(quiz_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Read<Question, i64> for QuestionRepository {
    async fn read(&self, id: &i64) -> Result<Option<Question>, Error> {
        sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE question_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}
