use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::category::Category;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::posts::{PageQuery, PostPageDto};

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryPageDto {
    pub(crate) category: CategoryDto,
    pub(crate) posts: PostPageDto,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            title: category.title,
            description: category.description,
            slug: category.slug,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/categories/{slug}/posts",
    tag = "categories",
    params(
        ("slug" = String, Path, description = "Category slug"),
        ("page" = Option<u32>, Query, description = "Page number (>= 1)")
    ),
    responses(
        (status = 200, description = "Publicly visible posts in the category", body = CategoryPageDto),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category missing or unpublished"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn category_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<(StatusCode, Json<CategoryPageDto>)> {
    query.validate()?;
    let page = query.page.unwrap_or(1);

    let result = state
        .blog_service
        .list_category_posts(&slug, Utc::now(), page)
        .await?;

    Ok((
        StatusCode::OK,
        Json(CategoryPageDto {
            category: result.category.into(),
            posts: result.posts.into(),
        }),
    ))
}
