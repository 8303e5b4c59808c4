use crate::core::{AppError, AppState};
use crate::entities::{Quiz, User};
use crate::repositories::Read;
use axum::extract::State;
use axum::{Error, body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// struct che codifica il contenuto del token jwt
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: i64,
    pub username: String,
}

#[instrument(skip(secret), fields(username = %username, id = %id))]
pub fn encode_jwt(username: String, id: i64, secret: &str) -> Result<String, Error> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let expire: chrono::TimeDelta = Duration::hours(24);
    let exp: usize = (now + expire).timestamp() as usize;
    let iat: usize = now.timestamp() as usize;
    let claim = Claims {
        iat,
        exp,
        username,
        id,
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map(|token| {
        info!("JWT token encoded successfully");
        token
    })
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        Error::new("Error in encoding jwt token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, Error> {
    debug!("Decoding JWT token");
    decode(
        jwt_token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data: TokenData<Claims>| {
        debug!("JWT token decoded for user: {}", data.claims.username);
        data
    })
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        Error::new("Error in decoding jwt token")
    })
}

/// Resolves a bearer credential to a user. Used by the HTTP middleware and by
/// the WebSocket handshake, which receives the token as a query parameter.
#[instrument(skip(state, token))]
pub async fn resolve_token(state: &AppState, token: Option<&str>) -> Result<User, AppError> {
    let token = match token.map(str::trim) {
        Some(token) if !token.is_empty() => token,
        _ => {
            warn!("Missing credential");
            return Err(AppError::unauthorized("Please provide a JWT token"));
        }
    };

    let token_data = decode_jwt(token, &state.jwt_secret)
        .map_err(|_| AppError::unauthorized("Unable to decode token"))?;

    // Fetch the user details from the database
    match state.user.read(&token_data.claims.id).await? {
        Some(user) if user.username == token_data.claims.username => {
            info!("User authenticated: {}", user.username);
            Ok(user)
        }
        _ => {
            warn!("User not found in database: {}", token_data.claims.username);
            Err(AppError::unauthorized("You are not an authorized user"))
        }
    }
}

#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let auth_header = match req.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::unauthorized("Empty header is not allowed")
        })?,
        None => {
            warn!("Missing authorization header");
            return Err(AppError::unauthorized(
                "Please add the JWT token to the header",
            ));
        }
    };

    let mut header = auth_header.split_whitespace();
    let token = match (header.next(), header.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => token,
        _ => {
            warn!("Authorization header is not a bearer token");
            return Err(AppError::unauthorized("Expected a Bearer token"));
        }
    };

    let current_user = resolve_token(&state, Some(token)).await?;
    req.extensions_mut().insert(current_user);
    // l'utente si recupera dall'Extension negli handler
    Ok(next.run(req).await)
}

/// Verifica che l'utente sia il proprietario del quiz
pub fn require_quiz_owner(quiz: &Quiz, user: &User) -> Result<(), AppError> {
    if quiz.owner_id != user.user_id {
        warn!(
            "User {} is not the owner of quiz {}",
            user.user_id, quiz.quiz_id
        );
        return Err(AppError::forbidden("You are not the owner of this quiz"));
    }
    Ok(())
}
