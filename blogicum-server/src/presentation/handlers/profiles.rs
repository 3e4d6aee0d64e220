use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::user::{UpdateProfileRequest, User};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::posts::{PageQuery, PostPageDto};
use crate::presentation::middleware::auth::{AuthenticatedUser, MaybeUser};

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfileDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfilePageDto {
    pub(crate) profile: ProfileDto,
    pub(crate) posts: PostPageDto,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateProfileDto {
    #[validate(length(min = 3, max = 64))]
    pub(crate) username: String,
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(max = 150))]
    pub(crate) first_name: String,
    #[validate(length(max = 150))]
    pub(crate) last_name: String,
}

impl From<User> for ProfileDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/profiles/{username}",
    tag = "profiles",
    params(
        ("username" = String, Path, description = "Username"),
        ("page" = Option<u32>, Query, description = "Page number (>= 1)")
    ),
    responses(
        (status = 200, description = "The user's posts; owners see all of their own posts", body = ProfilePageDto),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<(StatusCode, Json<ProfilePageDto>)> {
    query.validate()?;
    let page = query.page.unwrap_or(1);

    let result = state
        .blog_service
        .profile_posts(&username, viewer.user_id(), Utc::now(), page)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ProfilePageDto {
            profile: result.profile.into(),
            posts: result.posts.into(),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "profiles",
    security(
        ("bearer_auth" = [])
    ),
    request_body = UpdateProfileDto,
    responses(
        (status = 303, description = "Profile updated, redirects to the profile page"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Username or email already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<UpdateProfileDto>,
) -> AppResult<Redirect> {
    dto.validate()?;

    let req = UpdateProfileRequest {
        username: dto.username,
        email: dto.email,
        first_name: dto.first_name,
        last_name: dto.last_name,
    };
    let user = state.blog_service.update_profile(auth.user_id, req).await?;

    Ok(Redirect::to(&format!("/api/profiles/{}", user.username)))
}
