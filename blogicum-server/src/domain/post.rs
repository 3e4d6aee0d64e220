use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Category fields a post carries around for display and visibility checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CategoryRef {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LocationRef {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author_id: i64,
    pub(crate) location: Option<LocationRef>,
    pub(crate) category: Option<CategoryRef>,
    pub(crate) image: Option<String>,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

/// A post together with its comment-count annotation, as list pages show it.
#[derive(Debug, Clone)]
pub(crate) struct AnnotatedPost {
    pub(crate) post: Post,
    pub(crate) comment_count: i64,
}

impl Post {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: i64,
        title: impl Into<String>,
        text: impl Into<String>,
        pub_date: DateTime<Utc>,
        author_id: i64,
        location: Option<LocationRef>,
        category: Option<CategoryRef>,
        image: Option<String>,
        is_published: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("author_id", author_id)?;
        let title = normalize_title(&title.into())?;
        let text = normalize_text(&text.into())?;

        Ok(Self {
            id,
            title,
            text,
            pub_date,
            author_id,
            location,
            category,
            image,
            is_published,
            created_at,
        })
    }

    /// Whether a non-owner may see this post at `now`.
    ///
    /// A post without a category is gated only by its own flag and date;
    /// a categorized post additionally requires the category be published.
    pub(crate) fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_published
            && self.pub_date <= now
            && self.category.as_ref().is_none_or(|c| c.is_published)
    }

    /// The detail-page access gate: the author always sees their own post,
    /// everyone else goes through the visibility predicate.
    pub(crate) fn is_visible_to(&self, viewer: Option<i64>, now: DateTime<Utc>) -> bool {
        viewer == Some(self.author_id) || self.is_visible_at(now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) location_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) image: Option<String>,
    pub(crate) is_published: bool,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            text: normalize_text(&self.text)?,
            ..self
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) location_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) image: Option<String>,
    pub(crate) is_published: bool,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            text: normalize_text(&self.text)?,
            ..self
        })
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.len() > 256 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..256 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_text(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::Validation {
            field: "text",
            message: "must not be empty",
        });
    }
    Ok(text.to_string())
}
