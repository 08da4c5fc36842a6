use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;

use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// The caller behind a verified bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Validate the bearer JWT and attach the matching user to the request.
///
/// Missing, malformed or expired tokens are `401`; a valid token whose user
/// no longer exists is `400 Invalid user`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(ApiError::Unauthorized)?;

    let claims = state.tokens.verify(bearer.token()).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        ApiError::Unauthorized
    })?;
    let user_id = claims.user_id().ok_or(ApiError::Unauthorized)?;

    let user = blocking(&state, move |s| Ok(s.db.get_user_by_id(user_id)?))
        .await?
        .ok_or(ApiError::InvalidUser)?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
    });
    Ok(next.run(req).await)
}
