use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::categories::category_posts;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/{slug}/posts", get(category_posts))
}
