//! Attempt services - Tentativi del partecipante

use crate::core::{AppError, AppState};
use crate::dtos::{AttemptDTO, AttemptProgressDTO, SubmitAnswersDTO};
use crate::engine::ScoringEngine;
use crate::entities::{Attempt, User};
use crate::repositories::Read;
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

async fn load_own_attempt(
    state: &AppState,
    attempt_id: i64,
    user: &User,
) -> Result<Attempt, AppError> {
    let attempt = state
        .attempt
        .read(&attempt_id)
        .await?
        .ok_or_else(|| AppError::not_found("Attempt not found"))?;

    if attempt.participant_id != user.user_id {
        warn!(attempt_id, "Attempt belongs to another user");
        return Err(AppError::forbidden("This attempt belongs to another user"));
    }
    Ok(attempt)
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_attempts(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<AttemptDTO>>, AppError> {
    let attempts = state
        .attempt
        .find_many_by_participant(&current_user.user_id)
        .await?;
    Ok(Json(attempts.into_iter().map(AttemptDTO::from).collect()))
}

/// Registra le risposte in ordine e restituisce il progresso aggiornato
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn submit_answers(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(attempt_id): Path<i64>,
    Json(body): Json<SubmitAnswersDTO>,
) -> Result<Json<AttemptProgressDTO>, AppError> {
    body.validate()?;
    load_own_attempt(&state, attempt_id, &current_user).await?;

    let engine = ScoringEngine::new(&state);
    engine.record_answers(attempt_id, &body.answers).await?;

    let progress = engine.progress(attempt_id).await?;
    info!(score = progress.score, "Answers submitted");
    Ok(Json(progress))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn complete_attempt(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(attempt_id): Path<i64>,
) -> Result<Json<AttemptProgressDTO>, AppError> {
    let engine = ScoringEngine::new(&state);
    engine.complete(attempt_id, &current_user).await?;
    Ok(Json(engine.progress(attempt_id).await?))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn attempt_progress(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(attempt_id): Path<i64>,
) -> Result<Json<AttemptProgressDTO>, AppError> {
    load_own_attempt(&state, attempt_id, &current_user).await?;
    Ok(Json(ScoringEngine::new(&state).progress(attempt_id).await?))
}
