use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::data::post_repository::{
    NewPost, Pagination, PostPatch, PostQuery, PostRepository, PostVisibility,
};
use crate::domain::error::DomainError;
use crate::domain::post::{AnnotatedPost, CategoryRef, LocationRef, Post};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = r#"
    p.id,
    p.title,
    p.text,
    p.pub_date,
    p.author_id,
    p.image,
    p.is_published,
    p.created_at,
    c.id AS category_id,
    c.title AS category_title,
    c.slug AS category_slug,
    c.is_published AS category_is_published,
    l.id AS location_id,
    l.name AS location_name,
    l.is_published AS location_is_published
"#;

const POST_JOINS: &str = r#"
    FROM posts p
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: i64,
    image: Option<String>,
    is_published: bool,
    created_at: DateTime<Utc>,
    category_id: Option<i64>,
    category_title: Option<String>,
    category_slug: Option<String>,
    category_is_published: Option<bool>,
    location_id: Option<i64>,
    location_name: Option<String>,
    location_is_published: Option<bool>,
}

#[derive(sqlx::FromRow)]
struct AnnotatedPostRow {
    #[sqlx(flatten)]
    post: PostRow,
    comment_count: i64,
}

/// Appends the WHERE clause for a composed list query. The public filter
/// follows the visibility predicate; the category join leaves
/// `c.is_published` NULL for uncategorized posts, so `= TRUE` drops them
/// from public lists.
fn push_query_filters(builder: &mut QueryBuilder<'_, Postgres>, query: PostQuery) {
    builder.push(" WHERE TRUE");
    if let PostVisibility::PublicAt(now) = query.visibility {
        builder
            .push(" AND p.is_published = TRUE AND c.is_published = TRUE AND p.pub_date <= ")
            .push_bind(now);
    }
    if let Some(author_id) = query.author_id {
        builder.push(" AND p.author_id = ").push_bind(author_id);
    }
    if let Some(category_id) = query.category_id {
        builder.push(" AND p.category_id = ").push_bind(category_id);
    }
}

/// List query: annotated rows, newest first, sliced to the requested page.
fn build_list_query(query: PostQuery, pagination: Pagination) -> QueryBuilder<'static, Postgres> {
    let limit = i64::from(pagination.page_size);
    let offset = i64::from(pagination.page.saturating_sub(1)) * limit;

    let mut builder = QueryBuilder::new(format!(
        r#"
            SELECT {POST_COLUMNS},
                (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
            {POST_JOINS}
            "#
    ));
    push_query_filters(&mut builder, query);
    builder
        .push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    builder
}

fn build_count_query(query: PostQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) {POST_JOINS}"));
    push_query_filters(&mut builder, query);
    builder
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO posts (title, text, pub_date, author_id, location_id, category_id, image, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(&input.text)
        .bind(input.pub_date)
        .bind(input.author_id)
        .bind(input.location_id)
        .bind(input.category_id)
        .bind(&input.image)
        .bind(input.is_published)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        self.get_post(row.0).await?.ok_or_else(|| {
            DomainError::Unexpected(format!("created post {} not readable back", row.0))
        })
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!("SELECT {POST_COLUMNS} {POST_JOINS} WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn update_post(
        &self,
        post_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE posts
            SET title = $2,
                text = $3,
                pub_date = $4,
                location_id = $5,
                category_id = $6,
                image = $7,
                is_published = $8
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(post_id)
        .bind(&patch.title)
        .bind(&patch.text)
        .bind(patch.pub_date)
        .bind(patch.location_id)
        .bind(patch.category_id)
        .bind(&patch.image)
        .bind(patch.is_published)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        match row {
            Some((id,)) => self.get_post(id).await,
            None => Ok(None),
        }
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        query: PostQuery,
        pagination: Pagination,
    ) -> Result<Vec<AnnotatedPost>, DomainError> {
        let mut builder = build_list_query(query, pagination);

        let rows = builder
            .build_query_as::<AnnotatedPostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(AnnotatedPost {
                    post: map_row_to_post(row.post)?,
                    comment_count: row.comment_count,
                })
            })
            .collect()
    }

    async fn count_posts(&self, query: PostQuery) -> Result<i64, DomainError> {
        let mut builder = build_count_query(query);

        let (count,): (i64,) = builder
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(count)
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let category = match (
        row.category_id,
        row.category_title,
        row.category_slug,
        row.category_is_published,
    ) {
        (Some(id), Some(title), Some(slug), Some(is_published)) => Some(CategoryRef {
            id,
            title,
            slug,
            is_published,
        }),
        _ => None,
    };
    let location = match (row.location_id, row.location_name, row.location_is_published) {
        (Some(id), Some(name), Some(is_published)) => Some(LocationRef {
            id,
            name,
            is_published,
        }),
        _ => None,
    };

    Post::new(
        row.id,
        row.title,
        row.text,
        row.pub_date,
        row.author_id,
        location,
        category,
        row.image,
        row.is_published,
        row.created_at,
    )
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some("posts_author_id_fkey") => "author",
            Some("posts_category_id_fkey") => "category",
            Some("posts_location_id_fkey") => "location",
            _ => "post reference",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{build_count_query, build_list_query};
    use crate::data::post_repository::{Pagination, PostQuery};

    const PAGE: Pagination = Pagination {
        page: 1,
        page_size: 10,
    };

    #[test]
    fn list_query_orders_newest_first() {
        let sql = build_list_query(PostQuery::public_at(Utc::now()), PAGE).into_sql();
        assert!(sql.contains("ORDER BY p.pub_date DESC, p.id DESC"));
    }

    #[test]
    fn list_query_annotates_comment_count() {
        let sql = build_list_query(PostQuery::public_at(Utc::now()), PAGE).into_sql();
        assert!(
            sql.contains(
                "(SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count"
            )
        );
    }

    #[test]
    fn public_filter_gates_post_and_category_flags_and_pub_date() {
        let sql = build_list_query(PostQuery::public_at(Utc::now()), PAGE).into_sql();
        assert!(sql.contains("p.is_published = TRUE"));
        assert!(sql.contains("c.is_published = TRUE"));
        assert!(sql.contains("p.pub_date <= "));
    }

    #[test]
    fn any_visibility_skips_the_public_filter() {
        let query = PostQuery::public_at(Utc::now())
            .by_author(10)
            .any_visibility();
        let sql = build_list_query(query, PAGE).into_sql();
        assert!(!sql.contains("p.is_published"));
        assert!(sql.contains("p.author_id = "));
    }

    #[test]
    fn count_query_applies_the_same_filters() {
        let query = PostQuery::public_at(Utc::now()).by_category(3);
        let sql = build_count_query(query).into_sql();
        assert!(sql.starts_with("SELECT COUNT(*)"));
        assert!(sql.contains("c.is_published = TRUE"));
        assert!(sql.contains("p.category_id = "));
    }
}
