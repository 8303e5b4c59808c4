//! Scoring Engine - Registrazione delle risposte e punteggio dei tentativi

use crate::core::{AppState, CoreError};
use crate::dtos::{AnswerRequestDTO, AttemptProgressDTO};
use crate::entities::{Answer, Attempt, AttemptStatus, User, attempt::percentage_score};
use crate::repositories::{AnswerRepository, AttemptRepository, Read};
use tracing::{debug, info, instrument, warn};

pub struct ScoringEngine<'a> {
    state: &'a AppState,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Records one answer and, when the selected choice is correct, adds the question's
    /// points to the attempt score.
    ///
    /// Insert and increment share one transaction; the increment runs in SQL, so concurrent
    /// answers to different questions of the same attempt never lose an update.
    #[instrument(skip(self))]
    pub async fn record_answer(
        &self,
        attempt_id: i64,
        question_id: i64,
        choice_id: i64,
    ) -> Result<Answer, CoreError> {
        let attempt = self
            .state
            .attempt
            .read(&attempt_id)
            .await?
            .ok_or(CoreError::NotFound("attempt"))?;
        let question = self
            .state
            .question
            .read(&question_id)
            .await?
            .ok_or(CoreError::NotFound("question"))?;
        let choice = self
            .state
            .choice
            .read(&choice_id)
            .await?
            .ok_or(CoreError::NotFound("choice"))?;

        if question.quiz_id != attempt.quiz_id {
            return Err(CoreError::InvalidAnswer(
                "Question does not belong to the quiz of this attempt",
            ));
        }
        if choice.question_id != question.question_id {
            return Err(CoreError::InvalidAnswer(
                "Choice does not belong to this question",
            ));
        }
        if attempt.status != AttemptStatus::InProgress {
            return Err(CoreError::InvalidAnswer("Attempt is not in progress"));
        }

        let mut tx = self.state.pool.begin().await?;

        let answer = AnswerRepository::insert(&mut *tx, &attempt_id, &question_id, &choice_id)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    CoreError::DuplicateAnswer {
                        attempt_id,
                        question_id,
                    }
                }
                other => CoreError::from(other),
            })?
            // completato tra il controllo e la transazione
            .ok_or(CoreError::InvalidAnswer("Attempt is not in progress"))?;

        if choice.is_correct {
            AttemptRepository::add_to_score(&mut *tx, &attempt_id, question.points)
                .await
                .map_err(|e| match e {
                    // completato mentre rispondevamo
                    sqlx::Error::RowNotFound => {
                        CoreError::InvalidAnswer("Attempt is not in progress")
                    }
                    other => CoreError::from(other),
                })?;
            debug!(points = question.points, "Correct answer, score incremented");
        }

        tx.commit().await?;
        Ok(answer)
    }

    /// Records a batch of answers in order, stopping at the first failure.
    /// Answers recorded before the failure stay recorded.
    #[instrument(skip(self, answers), fields(count = answers.len()))]
    pub async fn record_answers(
        &self,
        attempt_id: i64,
        answers: &[AnswerRequestDTO],
    ) -> Result<Vec<Answer>, CoreError> {
        let mut recorded = Vec::with_capacity(answers.len());
        for answer in answers {
            let saved = self
                .record_answer(attempt_id, answer.question_id, answer.choice_id)
                .await
                .inspect_err(|e| warn!("Answer rejected: {}", e))?;
            recorded.push(saved);
        }
        info!(recorded = recorded.len(), "Answers recorded");
        Ok(recorded)
    }

    /// Score, percentage and number of answered questions of an attempt
    pub async fn progress(&self, attempt_id: i64) -> Result<AttemptProgressDTO, CoreError> {
        let attempt = self
            .state
            .attempt
            .read(&attempt_id)
            .await?
            .ok_or(CoreError::NotFound("attempt"))?;
        let max_score = self.state.quiz.max_score(&attempt.quiz_id).await?;
        let total_questions = self.state.quiz.total_questions(&attempt.quiz_id).await?;
        let answered_questions = self.state.answer.count_by_attempt(&attempt_id).await?;

        Ok(AttemptProgressDTO {
            attempt_id,
            status: attempt.status,
            score: attempt.score,
            max_score,
            percentage_score: percentage_score(attempt.score, max_score),
            answered_questions,
            total_questions,
        })
    }

    /// Percentage score of an attempt against the current max score of its quiz
    pub async fn percentage_score(&self, attempt: &Attempt) -> Result<f64, CoreError> {
        let max_score = self.state.quiz.max_score(&attempt.quiz_id).await?;
        Ok(attempt.percentage_score(max_score))
    }

    /// InProgress -> Completed, only for the participant of the attempt
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub async fn complete(&self, attempt_id: i64, user: &User) -> Result<Attempt, CoreError> {
        let attempt = self
            .state
            .attempt
            .read(&attempt_id)
            .await?
            .ok_or(CoreError::NotFound("attempt"))?;

        if attempt.participant_id != user.user_id {
            return Err(CoreError::Forbidden("This attempt belongs to another user"));
        }

        let completed = self
            .state
            .attempt
            .complete(&attempt_id)
            .await?
            .ok_or(CoreError::InvalidAnswer("Attempt is not in progress"))?;
        info!(score = completed.score, "Attempt completed");
        Ok(completed)
    }
}
