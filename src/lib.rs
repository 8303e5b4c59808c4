//! Server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod engine;
pub mod entities;
pub mod repositories;
pub mod services;
pub mod sweeper;
pub mod ws;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, CoreError, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{any, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    use ws::ws_handler;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/auth", configure_auth_routes())
        .nest("/quizzes", configure_quiz_routes(state.clone()))
        .nest("/invitations", configure_invitation_routes(state.clone()))
        .nest("/attempts", configure_attempt_routes(state.clone()))
        // il token arriva in query string, verificato dentro ws_handler prima dell'upgrade
        .route("/ws", any(ws_handler))
        .layer(cors)
        .with_state(state)
}

/// Configura le routes di autenticazione (login, register)
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/login", post(login_user))
        .route("/register", post(register_user))
}

/// Configura le routes dei quiz: area del creatore e vista del partecipante
fn configure_quiz_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_playable_quizzes))
        .route("/{quiz_id}", get(get_playable_quiz))
        .route("/creator", get(list_owned_quizzes).post(create_quiz))
        .route(
            "/creator/{quiz_id}",
            get(get_owned_quiz).patch(update_quiz).delete(delete_quiz),
        )
        .route(
            "/creator/{quiz_id}/questions",
            get(list_questions).post(create_question),
        )
        .route("/creator/{quiz_id}/progress", get(quiz_progress))
        .route("/creator/{quiz_id}/invite", post(invite_participant))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes per la gestione degli inviti
fn configure_invitation_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/pending", get(list_pending_invitations))
        .route("/{invitation_id}/{action}", post(respond_to_invitation))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes dei tentativi
fn configure_attempt_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_attempts))
        .route("/{attempt_id}/answers", post(submit_answers))
        .route("/{attempt_id}/complete", post(complete_attempt))
        .route("/{attempt_id}/progress", get(attempt_progress))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
