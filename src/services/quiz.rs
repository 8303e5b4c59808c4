//! Quiz services - Endpoint del creatore e vista del partecipante

use crate::core::{AppError, AppState, require_quiz_owner};
use crate::dtos::{
    CreateQuestionDTO, CreateQuizDTO, InvitationDTO, InviteRequestDTO, QuestionDTO, QuizDTO,
    QuizDetailDTO, QuizProgressDTO, UpdateQuizDTO,
};
use crate::engine::InvitationStateMachine;
use crate::entities::{AttemptStatus, Quiz, User};
use crate::repositories::{Delete, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

/// Carica il quiz e verifica che l'utente corrente ne sia il proprietario
async fn load_owned_quiz(state: &AppState, quiz_id: i64, user: &User) -> Result<Quiz, AppError> {
    let quiz = state
        .quiz
        .read(&quiz_id)
        .await?
        .ok_or_else(|| AppError::not_found("Quiz not found"))?;
    require_quiz_owner(&quiz, user)?;
    Ok(quiz)
}

async fn quiz_detail(
    state: &AppState,
    quiz: Quiz,
    reveal_correct: bool,
) -> Result<QuizDetailDTO, AppError> {
    let questions = state.question.find_many_by_quiz(&quiz.quiz_id).await?;
    let choices = state.choice.find_many_by_quiz(&quiz.quiz_id).await?;
    let max_score = questions.iter().map(|q| q.points).sum();
    let total_questions = questions.len() as i64;

    let questions = questions
        .into_iter()
        .map(|q| QuestionDTO::with_choices(q, &choices, reveal_correct))
        .collect();

    Ok(QuizDetailDTO {
        quiz: QuizDTO::from(quiz),
        max_score,
        total_questions,
        questions,
    })
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_owned_quizzes(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<QuizDTO>>, AppError> {
    let quizzes = state.quiz.find_many_by_owner(&current_user.user_id).await?;
    debug!("User owns {} quizzes", quizzes.len());
    Ok(Json(quizzes.into_iter().map(QuizDTO::from).collect()))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_quiz(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CreateQuizDTO>,
) -> Result<(StatusCode, Json<QuizDTO>), AppError> {
    body.validate()?;
    if let (Some(start), Some(end)) = (body.start_time, body.end_time) {
        if end <= start {
            return Err(AppError::bad_request("end_time must be after start_time"));
        }
    }

    let quiz = state
        .quiz
        .create_for_owner(current_user.user_id, &body)
        .await?;
    info!(quiz_id = quiz.quiz_id, "Quiz created");
    Ok((StatusCode::CREATED, Json(QuizDTO::from(quiz))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_owned_quiz(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(quiz_id): Path<i64>,
) -> Result<Json<QuizDetailDTO>, AppError> {
    let quiz = load_owned_quiz(&state, quiz_id, &current_user).await?;
    Ok(Json(quiz_detail(&state, quiz, true).await?))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn update_quiz(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(quiz_id): Path<i64>,
    Json(body): Json<UpdateQuizDTO>,
) -> Result<Json<QuizDTO>, AppError> {
    body.validate()?;
    load_owned_quiz(&state, quiz_id, &current_user).await?;

    let quiz = state.quiz.update(&quiz_id, &body).await?;
    info!(status = ?quiz.status, "Quiz updated");
    Ok(Json(QuizDTO::from(quiz)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn delete_quiz(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(quiz_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    load_owned_quiz(&state, quiz_id, &current_user).await?;
    state.quiz.delete(&quiz_id).await?;
    info!(quiz_id, "Quiz deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_questions(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(quiz_id): Path<i64>,
) -> Result<Json<Vec<QuestionDTO>>, AppError> {
    let quiz = load_owned_quiz(&state, quiz_id, &current_user).await?;
    Ok(Json(quiz_detail(&state, quiz, true).await?.questions))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_question(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(quiz_id): Path<i64>,
    Json(body): Json<CreateQuestionDTO>,
) -> Result<(StatusCode, Json<QuestionDTO>), AppError> {
    body.validate()?;
    load_owned_quiz(&state, quiz_id, &current_user).await?;

    // domanda e scelte in una sola transazione: un vincolo violato annulla tutto
    let (question, choices) = state.question.create_with_choices(&quiz_id, &body).await?;
    info!(question_id = question.question_id, "Question created");
    Ok((
        StatusCode::CREATED,
        Json(QuestionDTO::with_choices(question, &choices, true)),
    ))
}

/// Statistiche del quiz: tentativi, domande e media percentuale dei tentativi completati
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn quiz_progress(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(quiz_id): Path<i64>,
) -> Result<Json<QuizProgressDTO>, AppError> {
    load_owned_quiz(&state, quiz_id, &current_user).await?;

    let attempts = state.attempt.find_many_by_quiz(&quiz_id).await?;
    let max_score = state.quiz.max_score(&quiz_id).await?;
    let total_questions = state.quiz.total_questions(&quiz_id).await?;

    let completed: Vec<f64> = attempts
        .iter()
        .filter(|a| a.status == AttemptStatus::Completed)
        .map(|a| a.percentage_score(max_score))
        .collect();

    let average_percentage = if completed.is_empty() {
        0.0
    } else {
        let mean = completed.iter().sum::<f64>() / completed.len() as f64;
        (mean * 100.0).round() / 100.0
    };

    Ok(Json(QuizProgressDTO {
        quiz_id,
        total_attempts: attempts.len() as i64,
        completed_attempts: completed.len() as i64,
        total_questions,
        max_score,
        average_percentage,
    }))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, participant_id = %body.participant_id))]
pub async fn invite_participant(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(quiz_id): Path<i64>,
    Json(body): Json<InviteRequestDTO>,
) -> Result<(StatusCode, Json<InvitationDTO>), AppError> {
    let quiz = load_owned_quiz(&state, quiz_id, &current_user).await?;
    let participant = state
        .user
        .read(&body.participant_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let invitation = InvitationStateMachine::new(&state)
        .invite(&quiz, &participant, &current_user)
        .await?;

    Ok((StatusCode::CREATED, Json(InvitationDTO::from(invitation))))
}

/// Quiz per cui l'utente ha almeno un tentativo
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_playable_quizzes(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<QuizDTO>>, AppError> {
    let quizzes = state
        .quiz
        .find_many_by_participant(&current_user.user_id)
        .await?;
    Ok(Json(quizzes.into_iter().map(QuizDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_playable_quiz(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(quiz_id): Path<i64>,
) -> Result<Json<QuizDetailDTO>, AppError> {
    let quiz = state
        .quiz
        .read(&quiz_id)
        .await?
        .ok_or_else(|| AppError::not_found("Quiz not found"))?;

    if !state
        .quiz
        .is_playable_by(&quiz_id, &current_user.user_id)
        .await?
    {
        return Err(AppError::forbidden("You have not joined this quiz"));
    }

    // le risposte corrette restano nascoste al partecipante
    Ok(Json(quiz_detail(&state, quiz, false).await?))
}

