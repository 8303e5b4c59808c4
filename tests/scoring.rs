//! Integration tests per il motore di punteggio
//!
//! Fixtures: il quiz 1 vale 5 punti (domande da 1, 2 e 2 punti), bob ha il tentativo 1 in corso.
//! Scelte corrette: 1 (domanda 1), 3 (domanda 2), 5 (domanda 3).

mod common;

#[cfg(test)]
mod scoring_tests {
    use super::common::*;
    use quiz_server::core::CoreError;
    use quiz_server::dtos::AnswerRequestDTO;
    use quiz_server::engine::ScoringEngine;
    use quiz_server::entities::AttemptStatus;
    use quiz_server::repositories::{AnswerRepository, Read};
    use sqlx::SqlitePool;

    async fn score_of(state: &quiz_server::AppState, attempt_id: i64) -> i64 {
        state.attempt.read(&attempt_id).await.unwrap().unwrap().score
    }

    // ============================================================
    // Scenario 2: punteggio percentuale
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "quizzes", "attempts")))]
    async fn test_percentage_score_after_answers(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let engine = ScoringEngine::new(&state);

        engine.record_answer(1, 1, 2).await.unwrap(); // sbagliata
        engine.record_answer(1, 2, 3).await.unwrap(); // +2
        engine.record_answer(1, 3, 5).await.unwrap(); // +2

        let attempt = state.attempt.read(&1).await?.unwrap();
        assert_eq!(attempt.score, 4);
        assert_eq!(engine.percentage_score(&attempt).await.unwrap(), 80.0);

        let progress = engine.progress(1).await.unwrap();
        assert_eq!(progress.max_score, 5);
        assert_eq!(progress.answered_questions, 3);
        assert_eq!(progress.total_questions, 3);
        assert_eq!(progress.percentage_score, 80.0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "quizzes", "attempts")))]
    async fn test_wrong_answer_does_not_change_score(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        let answer = ScoringEngine::new(&state)
            .record_answer(1, 2, 4)
            .await
            .unwrap();

        assert_eq!(answer.selected_choice_id, 4);
        assert_eq!(score_of(&state, 1).await, 0);
        Ok(())
    }

    // ============================================================
    // Risposte duplicate e non valide
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "quizzes", "attempts")))]
    async fn test_duplicate_answer_keeps_score(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let engine = ScoringEngine::new(&state);

        engine.record_answer(1, 2, 3).await.unwrap();
        let err = engine.record_answer(1, 2, 3).await.unwrap_err();

        assert!(matches!(
            err,
            CoreError::DuplicateAnswer {
                attempt_id: 1,
                question_id: 2
            }
        ));
        assert_eq!(score_of(&state, 1).await, 2);
        assert_eq!(state.answer.count_by_attempt(&1).await?, 1);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "quizzes", "attempts")))]
    async fn test_answer_must_match_quiz_and_question(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let engine = ScoringEngine::new(&state);

        // domanda 4 appartiene al quiz 3
        assert!(matches!(
            engine.record_answer(1, 4, 7).await,
            Err(CoreError::InvalidAnswer(_))
        ));
        // scelta 5 appartiene alla domanda 3
        assert!(matches!(
            engine.record_answer(1, 1, 5).await,
            Err(CoreError::InvalidAnswer(_))
        ));
        assert!(matches!(
            engine.record_answer(99, 1, 1).await,
            Err(CoreError::NotFound("attempt"))
        ));
        assert!(matches!(
            engine.record_answer(1, 1, 99).await,
            Err(CoreError::NotFound("choice"))
        ));

        assert_eq!(score_of(&state, 1).await, 0);
        assert_eq!(state.answer.count_by_attempt(&1).await?, 0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "quizzes", "attempts")))]
    async fn test_completed_attempt_accepts_no_answers(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let engine = ScoringEngine::new(&state);
        let bob = load_user(&state, BOB).await;

        let completed = engine.complete(1, &bob).await.unwrap();
        assert_eq!(completed.status, AttemptStatus::Completed);
        assert!(completed.completed_at.is_some());

        assert!(matches!(
            engine.record_answer(1, 1, 1).await,
            Err(CoreError::InvalidAnswer(_))
        ));
        // già completato
        assert!(matches!(
            engine.complete(1, &bob).await,
            Err(CoreError::InvalidAnswer(_))
        ));
        Ok(())
    }

    // La guardia sullo stato sta nell'INSERT: anche una risposta sbagliata, che non tocca
    // il punteggio, non entra in un tentativo completato dopo il controllo iniziale.
    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "quizzes", "attempts")))]
    async fn test_answer_insert_requires_in_progress_attempt(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());
        state.attempt.complete(&1).await?.unwrap();

        let mut tx = pool.begin().await?;
        let inserted = AnswerRepository::insert(&mut *tx, &1, &1, &2).await?;
        tx.commit().await?;

        assert!(inserted.is_none());
        assert_eq!(state.answer.count_by_attempt(&1).await?, 0);
        assert_eq!(score_of(&state, 1).await, 0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "quizzes", "attempts")))]
    async fn test_only_participant_completes_attempt(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let alice = load_user(&state, ALICE).await;

        assert!(matches!(
            ScoringEngine::new(&state).complete(1, &alice).await,
            Err(CoreError::Forbidden(_))
        ));
        let attempt = state.attempt.read(&1).await?.unwrap();
        assert_eq!(attempt.status, AttemptStatus::InProgress);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "quizzes", "attempts")))]
    async fn test_batch_stops_at_first_failure(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        let answers = [
            AnswerRequestDTO {
                question_id: 1,
                choice_id: 1,
            },
            AnswerRequestDTO {
                question_id: 1,
                choice_id: 2,
            },
            AnswerRequestDTO {
                question_id: 2,
                choice_id: 3,
            },
        ];
        let err = ScoringEngine::new(&state)
            .record_answers(1, &answers)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::DuplicateAnswer { .. }));
        // solo la prima risposta è stata registrata
        assert_eq!(state.answer.count_by_attempt(&1).await?, 1);
        assert_eq!(score_of(&state, 1).await, 1);
        Ok(())
    }

    // ============================================================
    // Scenario 6: risposte concorrenti sullo stesso tentativo
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "quizzes", "attempts")))]
    async fn test_concurrent_correct_answers_sum_up(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        let handles: Vec<_> = [(1, 1), (2, 3), (3, 5)]
            .into_iter()
            .map(|(question_id, choice_id)| {
                let state = state.clone();
                tokio::spawn(async move {
                    ScoringEngine::new(&state)
                        .record_answer(1, question_id, choice_id)
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(score_of(&state, 1).await, 5);
        assert_eq!(state.answer.count_by_attempt(&1).await?, 3);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "quizzes", "attempts")))]
    async fn test_concurrent_duplicates_count_once(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let state = state.clone();
                tokio::spawn(async move { ScoringEngine::new(&state).record_answer(1, 2, 3).await })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(CoreError::DuplicateAnswer { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(score_of(&state, 1).await, 2);
        Ok(())
    }
}
