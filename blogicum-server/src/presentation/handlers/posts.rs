use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::blog_service::{OwnershipOutcome, PostPage};
use crate::domain::post::{AnnotatedPost, CreatePostRequest, Post, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::comments::CommentDto;
use crate::presentation::middleware::auth::{AuthenticatedUser, MaybeUser};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PostFormDto {
    #[validate(length(min = 1, max = 256))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) text: String,
    /// A future date defers publication until that instant.
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) location_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) image: Option<String>,
    #[serde(default = "default_is_published")]
    pub(crate) is_published: bool,
}

fn default_is_published() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PageQuery {
    #[validate(range(min = 1))]
    pub(crate) page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryRefDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LocationRefDto {
    pub(crate) id: i64,
    pub(crate) name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author_id: i64,
    pub(crate) location: Option<LocationRefDto>,
    pub(crate) category: Option<CategoryRefDto>,
    pub(crate) image: Option<String>,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostListItemDto {
    #[serde(flatten)]
    pub(crate) post: PostDto,
    pub(crate) comment_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostPageDto {
    pub(crate) posts: Vec<PostListItemDto>,
    pub(crate) page: u32,
    pub(crate) page_size: u32,
    pub(crate) total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    pub(crate) post: PostDto,
    pub(crate) comments: Vec<CommentDto>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            text: post.text,
            pub_date: post.pub_date,
            author_id: post.author_id,
            location: post.location.map(|l| LocationRefDto {
                id: l.id,
                name: l.name,
            }),
            category: post.category.map(|c| CategoryRefDto {
                id: c.id,
                title: c.title,
                slug: c.slug,
            }),
            image: post.image,
            is_published: post.is_published,
            created_at: post.created_at,
        }
    }
}

impl From<AnnotatedPost> for PostListItemDto {
    fn from(annotated: AnnotatedPost) -> Self {
        Self {
            post: annotated.post.into(),
            comment_count: annotated.comment_count,
        }
    }
}

impl From<PostPage> for PostPageDto {
    fn from(page: PostPage) -> Self {
        Self {
            posts: page.posts.into_iter().map(PostListItemDto::from).collect(),
            page: page.page,
            page_size: page.page_size,
            total: page.total,
        }
    }
}

impl From<PostFormDto> for CreatePostRequest {
    fn from(dto: PostFormDto) -> Self {
        Self {
            title: dto.title,
            text: dto.text,
            pub_date: dto.pub_date,
            location_id: dto.location_id,
            category_id: dto.category_id,
            image: dto.image,
            is_published: dto.is_published,
        }
    }
}

impl From<PostFormDto> for UpdatePostRequest {
    fn from(dto: PostFormDto) -> Self {
        Self {
            title: dto.title,
            text: dto.text,
            pub_date: dto.pub_date,
            location_id: dto.location_id,
            category_id: dto.category_id,
            image: dto.image,
            is_published: dto.is_published,
        }
    }
}

pub(crate) fn post_detail_path(post_id: i64) -> String {
    format!("/api/posts/{post_id}")
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(
        ("page" = Option<u32>, Query, description = "Page number (>= 1)")
    ),
    responses(
        (status = 200, description = "Publicly visible posts, newest first", body = PostPageDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<(StatusCode, Json<PostPageDto>)> {
    query.validate()?;
    let page = query.page.unwrap_or(1);

    let result = state
        .blog_service
        .list_public_posts(Utc::now(), page)
        .await?;

    Ok((StatusCode::OK, Json(PostPageDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post with its comments", body = PostDetailDto),
        (status = 404, description = "Post not found or not visible to this viewer"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<PostDetailDto>)> {
    let detail = state
        .blog_service
        .get_post(id, viewer.user_id(), Utc::now())
        .await?;

    Ok((
        StatusCode::OK,
        Json(PostDetailDto {
            post: detail.post.into(),
            comments: detail.comments.into_iter().map(CommentDto::from).collect(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = PostFormDto,
    responses(
        (status = 303, description = "Post created, redirects to the author's profile"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<PostFormDto>,
) -> AppResult<Redirect> {
    dto.validate()?;

    state
        .blog_service
        .create_post(auth.user_id, CreatePostRequest::from(dto))
        .await?;

    Ok(Redirect::to(&format!("/api/profiles/{}", auth.username)))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = PostFormDto,
    responses(
        (status = 303, description = "Redirects to the post detail page; only the author's edit is applied"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<PostFormDto>,
) -> AppResult<Response> {
    // No body validation here: the service checks ownership first, and a
    // non-owner must get the redirect even with a malformed payload.
    let outcome = state
        .blog_service
        .update_post(auth.user_id, id, UpdatePostRequest::from(dto))
        .await?;

    // Both arms land on the detail page; a non-owner simply changed nothing.
    let target = match outcome {
        OwnershipOutcome::Applied(post) => post_detail_path(post.id),
        OwnershipOutcome::NotOwner { post_id } => post_detail_path(post_id),
    };
    Ok(Redirect::to(&target).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 303, description = "Redirects to the index after deletion, or to the post when the requester is not the author"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    let outcome = state.blog_service.delete_post(auth.user_id, id).await?;

    let target = match outcome {
        OwnershipOutcome::Applied(()) => "/api/posts".to_string(),
        OwnershipOutcome::NotOwner { post_id } => post_detail_path(post_id),
    };
    Ok(Redirect::to(&target))
}
