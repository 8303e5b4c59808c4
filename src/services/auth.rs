//! Auth services - Gestione autenticazione e registrazione utenti

use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{CreateUserDTO, LoginDTO, UserDTO};
use crate::entities::User;
use crate::repositories::Create;
use axum::{
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Cercare l'utente tramite username, UNAUTHORIZED se non esiste
    // 2. Verificare la password contro l'hash salvato
    // 3. Generare il token JWT e restituirlo sia come cookie sia nell'header Authorization
    let user = match state.user.find_by_username(&body.username).await? {
        Some(user) => user,
        None => {
            warn!("Login attempt for unknown user");
            return Err(AppError::unauthorized("Username or password are not correct."));
        }
    };

    if !user.verify_password(&body.password) {
        warn!("Wrong password");
        return Err(AppError::unauthorized("Username or password are not correct."));
    }

    let token = encode_jwt(user.username, user.user_id, &state.jwt_secret)?;

    let cookie_value = format!(
        "token={}; HttpOnly; Secure; SameSite=Lax; Max-Age={}",
        token,
        24 * 60 * 60
    );

    let invalid_header = |_| AppError::internal_server_error("Failed to build auth headers");
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie_value).map_err(invalid_header)?,
    );
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).map_err(invalid_header)?,
    );

    info!("User logged in");
    Ok((StatusCode::OK, headers))
}

#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserDTO>,
) -> Result<(StatusCode, Json<UserDTO>), AppError> {
    body.validate()?;

    if state.user.find_by_username(&body.username).await?.is_some() {
        return Err(AppError::conflict("Username already exists"));
    }

    let password_hash = User::hash_password(&body.password)
        .map_err(|_| AppError::internal_server_error("Failed to hash password"))?;

    let new_user = CreateUserDTO {
        password: password_hash,
        ..body
    };

    let created_user = state.user.create(&new_user).await?;
    info!(user_id = created_user.user_id, "User registered");

    Ok((StatusCode::CREATED, Json(UserDTO::from(created_user))))
}
