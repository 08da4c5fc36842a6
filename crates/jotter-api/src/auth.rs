use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};

use jotter_types::api::{LoginRequest, RegisterRequest, TokenResponse, UserResponse};

use crate::error::ApiError;
use crate::extract::{ValidForm, ValidJson};
use crate::state::{AppState, blocking};

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |s| {
        // Skip the hash for an obviously taken name; the UNIQUE constraint
        // still settles concurrent registrations.
        if s.db.get_user_by_username(&req.username)?.is_some() {
            return Err(ApiError::UsernameTaken);
        }

        let password_hash = s
            .passwords
            .hash(&req.password)
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

        Ok(s.db.create_user(&req.username, &password_hash)?)
    })
    .await?;

    info!(user_id = user.id, username = %user.username, "User registered");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /login with a JSON body.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    authenticate(&state, req).await.map(Json)
}

/// POST /token with an OAuth2 password-grant form body.
pub async fn token(
    State(state): State<AppState>,
    ValidForm(req): ValidForm<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    authenticate(&state, req).await.map(Json)
}

async fn authenticate(state: &AppState, req: LoginRequest) -> Result<TokenResponse, ApiError> {
    let user = blocking(state, move |s| {
        let Some(user) = s.db.get_user_by_username(&req.username)? else {
            s.passwords.verify_dummy(&req.password);
            return Ok(None);
        };

        Ok(s.passwords.verify(&req.password, &user.password).then_some(user))
    })
    .await?;

    let Some(user) = user else {
        warn!("Rejected login attempt");
        return Err(ApiError::InvalidCredentials);
    };

    let token = state
        .tokens
        .issue(user.id, &user.username)
        .map_err(|e| ApiError::Internal(format!("issuing token: {e}")))?;

    info!(user_id = user.id, "User logged in");
    Ok(TokenResponse::bearer(token))
}
