//! AttemptRepository - Repository per i tentativi dei partecipanti

use super::Read;
use crate::entities::{Attempt, AttemptStatus};
use chrono::Utc;
use sqlx::{Error, SqliteConnection, SqlitePool};
use tracing::{debug, instrument};

const ATTEMPT_COLUMNS: &str =
    "attempt_id, quiz_id, participant_id, status, score, started_at, completed_at";

pub struct AttemptRepository {
    connection_pool: SqlitePool,
}

impl AttemptRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Opens the in-progress attempt of `(quiz_id, participant_id)`.
    ///
    /// Idempotent: the partial unique index allows a single IN_PROGRESS row per pair,
    /// so a second call returns the attempt that already exists.
    #[instrument(skip(conn))]
    pub async fn open_in_progress(
        conn: &mut SqliteConnection,
        quiz_id: &i64,
        participant_id: &i64,
    ) -> Result<Attempt, Error> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO attempts (quiz_id, participant_id, status, score, started_at)
            VALUES (?, ?, ?, 0, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(quiz_id)
        .bind(participant_id)
        .bind(AttemptStatus::InProgress)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if inserted == 0 {
            debug!("Attempt already in progress, reusing it");
        }

        sqlx::query_as::<_, Attempt>(&format!(
            r#"
            SELECT {ATTEMPT_COLUMNS} FROM attempts
            WHERE quiz_id = ? AND participant_id = ? AND status = 'IN_PROGRESS'
            "#
        ))
        .bind(quiz_id)
        .bind(participant_id)
        .fetch_one(&mut *conn)
        .await
    }

    /// Incremento atomico lato database: niente read-modify-write in memoria
    pub async fn add_to_score(
        conn: &mut SqliteConnection,
        attempt_id: &i64,
        points: i64,
    ) -> Result<(), Error> {
        let result = sqlx::query(
            "UPDATE attempts SET score = score + ? WHERE attempt_id = ? AND status = 'IN_PROGRESS'",
        )
        .bind(points)
        .bind(attempt_id)
        .execute(conn)
        .await?;

        if result.rows_affected() != 1 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }

    /// Chiude un tentativo in corso. Returns `None` if it was not IN_PROGRESS.
    #[instrument(skip(self))]
    pub async fn complete(&self, attempt_id: &i64) -> Result<Option<Attempt>, Error> {
        sqlx::query_as::<_, Attempt>(&format!(
            r#"
            UPDATE attempts SET status = ?, completed_at = ?
            WHERE attempt_id = ? AND status = 'IN_PROGRESS'
            RETURNING {ATTEMPT_COLUMNS}
            "#
        ))
        .bind(AttemptStatus::Completed)
        .bind(Utc::now())
        .bind(attempt_id)
        .fetch_optional(&self.connection_pool)
        .await
    }

    pub async fn find_many_by_participant(&self, participant_id: &i64) -> Result<Vec<Attempt>, Error> {
        sqlx::query_as::<_, Attempt>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM attempts WHERE participant_id = ? ORDER BY attempt_id"
        ))
        .bind(participant_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn find_many_by_quiz(&self, quiz_id: &i64) -> Result<Vec<Attempt>, Error> {
        sqlx::query_as::<_, Attempt>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM attempts WHERE quiz_id = ? ORDER BY attempt_id"
        ))
        .bind(quiz_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Read<Attempt, i64> for AttemptRepository {
    async fn read(&self, id: &i64) -> Result<Option<Attempt>, Error> {
        sqlx::query_as::<_, Attempt>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM attempts WHERE attempt_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}
