use axum::{
    Json,
    extract::{Path, State},
    response::Redirect,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::blog_service::OwnershipOutcome;
use crate::domain::comment::{Comment, CommentRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::posts::post_detail_path;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CommentFormDto {
    #[validate(length(min = 1))]
    pub(crate) text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            post_id: comment.post_id,
            author_id: comment.author_id,
            created_at: comment.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/comments",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = CommentFormDto,
    responses(
        (status = 303, description = "Comment created, redirects to the post detail page"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(dto): Json<CommentFormDto>,
) -> AppResult<Redirect> {
    dto.validate()?;

    let comment = state
        .blog_service
        .add_comment(auth.user_id, post_id, CommentRequest { text: dto.text })
        .await?;

    Ok(Redirect::to(&post_detail_path(comment.post_id)))
}

#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    request_body = CommentFormDto,
    responses(
        (status = 303, description = "Redirects to the parent post; only the author's edit is applied"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(comment_id): Path<i64>,
    Json(dto): Json<CommentFormDto>,
) -> AppResult<Redirect> {
    // No body validation here: ownership is decided first, so a non-owner
    // is redirected even when the payload would not validate.
    let outcome = state
        .blog_service
        .update_comment(auth.user_id, comment_id, CommentRequest { text: dto.text })
        .await?;

    let target = match outcome {
        OwnershipOutcome::Applied(comment) => post_detail_path(comment.post_id),
        OwnershipOutcome::NotOwner { post_id } => post_detail_path(post_id),
    };
    Ok(Redirect::to(&target))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 303, description = "Redirects to the parent post; only the author's delete is applied"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(comment_id): Path<i64>,
) -> AppResult<Redirect> {
    let outcome = state
        .blog_service
        .delete_comment(auth.user_id, comment_id)
        .await?;

    let target = match outcome {
        OwnershipOutcome::Applied(comment) => post_detail_path(comment.post_id),
        OwnershipOutcome::NotOwner { post_id } => post_detail_path(post_id),
    };
    Ok(Redirect::to(&target))
}
