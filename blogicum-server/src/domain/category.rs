use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl Category {
    pub(crate) fn new(
        id: i64,
        title: impl Into<String>,
        description: impl Into<String>,
        slug: impl Into<String>,
        is_published: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        let title = title.into().trim().to_string();
        if title.is_empty() || title.len() > 256 {
            return Err(DomainError::Validation {
                field: "title",
                message: "must be 1..256 chars",
            });
        }
        let slug = normalize_slug(&slug.into())?;

        Ok(Self {
            id,
            title,
            description: description.into(),
            slug,
            is_published,
            created_at,
        })
    }
}

/// Slugs are URL path segments: latin letters, digits, hyphen, underscore.
pub(crate) fn normalize_slug(slug: &str) -> Result<String, DomainError> {
    let slug = slug.trim();
    if slug.is_empty() || slug.len() > 64 {
        return Err(DomainError::Validation {
            field: "slug",
            message: "must be 1..64 chars",
        });
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(DomainError::Validation {
            field: "slug",
            message: "only latin letters, digits, '-' and '_' are allowed",
        });
    }
    Ok(slug.to_string())
}
