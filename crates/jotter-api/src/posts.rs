use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};

use jotter_db::OwnerCheck;
use jotter_types::api::{Detail, PostRequest, PostResponse};

use crate::error::ApiError;
use crate::extract::{ValidJson, ValidPath};
use crate::middleware::CurrentUser;
use crate::state::{AppState, blocking};

/// POST /posts
pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidJson(req): ValidJson<PostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = user.id;
    let row = blocking(&state, move |s| {
        Ok(s.db.create_post(user_id, &req.title, &req.content)?)
    })
    .await?;

    info!(post_id = row.id, user_id, "Post created");
    Ok((StatusCode::CREATED, Json(PostResponse::from(row))))
}

/// GET /posts. Public.
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let rows = blocking(&state, |s| Ok(s.db.list_posts()?)).await?;
    Ok(Json(rows.into_iter().map(PostResponse::from).collect()))
}

/// PUT /posts/{post_id}
pub async fn update_post(
    State(state): State<AppState>,
    ValidPath(post_id): ValidPath<i64>,
    Extension(user): Extension<CurrentUser>,
    ValidJson(req): ValidJson<PostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let user_id = user.id;
    let outcome = blocking(&state, move |s| {
        Ok(s.db.update_post(post_id, user_id, &req.title, &req.content)?)
    })
    .await?;

    match outcome {
        OwnerCheck::Applied(row) => {
            info!(post_id, user_id, "Post updated");
            Ok(Json(row.into()))
        }
        OwnerCheck::NotFound => Err(ApiError::NotFound),
        OwnerCheck::NotOwner => {
            warn!(post_id, user_id, "Refused update of a post owned by someone else");
            Err(ApiError::Forbidden)
        }
    }
}

/// DELETE /posts/{post_id}
pub async fn delete_post(
    State(state): State<AppState>,
    ValidPath(post_id): ValidPath<i64>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Detail>, ApiError> {
    let user_id = user.id;
    let outcome = blocking(&state, move |s| Ok(s.db.delete_post(post_id, user_id)?)).await?;

    match outcome {
        OwnerCheck::Applied(()) => {
            info!(post_id, user_id, "Post deleted");
            Ok(Json(Detail::new("Post deleted")))
        }
        OwnerCheck::NotFound => Err(ApiError::NotFound),
        OwnerCheck::NotOwner => {
            warn!(post_id, user_id, "Refused delete of a post owned by someone else");
            Err(ApiError::Forbidden)
        }
    }
}
