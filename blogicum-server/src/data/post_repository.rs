use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::{AnnotatedPost, Post};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author_id: i64,
    pub(crate) location_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) image: Option<String>,
    pub(crate) is_published: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) location_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) image: Option<String>,
    pub(crate) is_published: bool,
}

/// Which posts a list query selects.
///
/// `PublicAt` keeps only posts satisfying the visibility predicate at the
/// given instant (published, not future-dated, in a published category).
/// `All` skips the filter entirely, as when an author views their own
/// profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PostVisibility {
    PublicAt(DateTime<Utc>),
    All,
}

/// Explicit composition of the list-page query: optional equality filters
/// plus the visibility rule. Every "list of posts" page builds one of these.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PostQuery {
    pub(crate) author_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) visibility: PostVisibility,
}

impl PostQuery {
    pub(crate) fn public_at(now: DateTime<Utc>) -> Self {
        Self {
            author_id: None,
            category_id: None,
            visibility: PostVisibility::PublicAt(now),
        }
    }

    pub(crate) fn by_author(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub(crate) fn by_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub(crate) fn any_visibility(mut self) -> Self {
        self.visibility = PostVisibility::All;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) page_size: u32,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn update_post(&self, post_id: i64, patch: PostPatch)
    -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    /// Lists matching posts annotated with their comment count, ordered by
    /// `pub_date` descending (newest first), sliced to the requested page.
    async fn list_posts(
        &self,
        query: PostQuery,
        pagination: Pagination,
    ) -> Result<Vec<AnnotatedPost>, DomainError>;
    async fn count_posts(&self, query: PostQuery) -> Result<i64, DomainError>;
}
