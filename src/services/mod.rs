//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.
//! Le regole di dominio stanno in `engine`: qui solo controlli di proprietà e conversioni DTO.

pub mod attempt;
pub mod auth;
pub mod invitation;
pub mod quiz;

// Re-exports per facilitare l'import
pub use attempt::{attempt_progress, complete_attempt, list_attempts, submit_answers};
pub use auth::{login_user, register_user};
pub use invitation::{list_pending_invitations, respond_to_invitation};
pub use quiz::{
    create_question, create_quiz, delete_quiz, get_owned_quiz, get_playable_quiz,
    invite_participant, list_owned_quizzes, list_playable_quizzes, list_questions,
    quiz_progress, update_quiz,
};

use crate::core::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
