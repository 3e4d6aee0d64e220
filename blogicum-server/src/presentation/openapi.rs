use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::auth::{AuthResponseDto, LoginDto, RegisterDto, UserDto};
use crate::presentation::handlers::categories::{CategoryDto, CategoryPageDto};
use crate::presentation::handlers::comments::{CommentDto, CommentFormDto};
use crate::presentation::handlers::posts::{
    CategoryRefDto, LocationRefDto, PageQuery, PostDetailDto, PostDto, PostFormDto,
    PostListItemDto, PostPageDto,
};
use crate::presentation::handlers::profiles::{ProfileDto, ProfilePageDto, UpdateProfileDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::comments::add_comment,
        crate::presentation::handlers::comments::update_comment,
        crate::presentation::handlers::comments::delete_comment,
        crate::presentation::handlers::categories::category_posts,
        crate::presentation::handlers::profiles::get_profile,
        crate::presentation::handlers::profiles::update_profile
    ),
    components(
        schemas(
            RegisterDto,
            LoginDto,
            AuthResponseDto,
            UserDto,
            PostFormDto,
            PageQuery,
            PostDto,
            PostListItemDto,
            PostPageDto,
            PostDetailDto,
            CategoryRefDto,
            LocationRefDto,
            CommentDto,
            CommentFormDto,
            CategoryDto,
            CategoryPageDto,
            ProfileDto,
            ProfilePageDto,
            UpdateProfileDto
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "posts", description = "Post endpoints"),
        (name = "comments", description = "Comment endpoints"),
        (name = "categories", description = "Category endpoints"),
        (name = "profiles", description = "Profile endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
