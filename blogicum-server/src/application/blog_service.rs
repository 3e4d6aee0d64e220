use chrono::{DateTime, Utc};

use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::{
    NewPost, Pagination, PostPatch, PostQuery, PostRepository,
};
use crate::data::user_repository::{ProfilePatch, UserRepository};
use crate::domain::category::Category;
use crate::domain::comment::{Comment, CommentRequest};
use crate::domain::error::DomainError;
use crate::domain::post::{AnnotatedPost, CreatePostRequest, Post, UpdatePostRequest};
use crate::domain::user::{UpdateProfileRequest, User};

#[derive(Debug, Clone)]
pub(crate) struct PostPage {
    pub(crate) posts: Vec<AnnotatedPost>,
    pub(crate) page: u32,
    pub(crate) page_size: u32,
    pub(crate) total: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct CategoryPage {
    pub(crate) category: Category,
    pub(crate) posts: PostPage,
}

#[derive(Debug, Clone)]
pub(crate) struct ProfilePage {
    pub(crate) profile: User,
    pub(crate) posts: PostPage,
}

#[derive(Debug, Clone)]
pub(crate) struct PostDetail {
    pub(crate) post: Post,
    pub(crate) comments: Vec<Comment>,
}

/// Result of an edit/delete attempt that is gated by ownership.
///
/// A failed check is not an error: the caller is sent back to the post's
/// detail page with nothing mutated and nothing surfaced.
#[derive(Debug, Clone)]
pub(crate) enum OwnershipOutcome<T> {
    Applied(T),
    NotOwner { post_id: i64 },
}

pub(crate) struct BlogService<P, C, K, U>
where
    P: PostRepository,
    C: CommentRepository,
    K: CategoryRepository,
    U: UserRepository,
{
    posts: P,
    comments: C,
    categories: K,
    users: U,
    page_size: u32,
}

impl<P, C, K, U> BlogService<P, C, K, U>
where
    P: PostRepository,
    C: CommentRepository,
    K: CategoryRepository,
    U: UserRepository,
{
    pub(crate) fn new(posts: P, comments: C, categories: K, users: U, page_size: u32) -> Self {
        Self {
            posts,
            comments,
            categories,
            users,
            page_size,
        }
    }

    async fn load_page(&self, query: PostQuery, page: u32) -> Result<PostPage, DomainError> {
        let pagination = Pagination {
            page: page.max(1),
            page_size: self.page_size,
        };
        let posts = self.posts.list_posts(query, pagination).await?;
        let total = self.posts.count_posts(query).await?;

        Ok(PostPage {
            posts,
            page: pagination.page,
            page_size: pagination.page_size,
            total,
        })
    }

    /// Home page: publicly visible posts, annotated and newest first.
    pub(crate) async fn list_public_posts(
        &self,
        now: DateTime<Utc>,
        page: u32,
    ) -> Result<PostPage, DomainError> {
        self.load_page(PostQuery::public_at(now), page).await
    }

    /// Category page. The category must exist and be published before any
    /// posts are considered; otherwise the whole page is a NotFound.
    pub(crate) async fn list_category_posts(
        &self,
        slug: &str,
        now: DateTime<Utc>,
        page: u32,
    ) -> Result<CategoryPage, DomainError> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .filter(|category| category.is_published)
            .ok_or_else(|| DomainError::NotFound(format!("category slug: {slug}")))?;

        let query = PostQuery::public_at(now).by_category(category.id);
        let posts = self.load_page(query, page).await?;

        Ok(CategoryPage { category, posts })
    }

    /// Profile page. A user browsing their own profile sees every post they
    /// wrote, unpublished and future-dated ones included; anyone else sees
    /// only the publicly visible subset.
    pub(crate) async fn profile_posts(
        &self,
        username: &str,
        viewer: Option<i64>,
        now: DateTime<Utc>,
        page: u32,
    ) -> Result<ProfilePage, DomainError> {
        let profile = self
            .users
            .find_profile(username)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user: {username}")))?;

        let query = if viewer == Some(profile.id) {
            PostQuery::public_at(now)
                .by_author(profile.id)
                .any_visibility()
        } else {
            PostQuery::public_at(now).by_author(profile.id)
        };
        let posts = self.load_page(query, page).await?;

        Ok(ProfilePage { profile, posts })
    }

    /// Detail page. A post that fails the visibility predicate for this
    /// viewer is reported as missing, not forbidden, so unpublished content
    /// is indistinguishable from content that never existed.
    pub(crate) async fn get_post(
        &self,
        id: i64,
        viewer: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<PostDetail, DomainError> {
        let post = self
            .posts
            .get_post(id)
            .await?
            .filter(|post| post.is_visible_to(viewer, now))
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))?;

        let comments = self.comments.list_for_post(post.id).await?;

        Ok(PostDetail { post, comments })
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let new_post = NewPost {
            title: req.title,
            text: req.text,
            pub_date: req.pub_date,
            author_id,
            location_id: req.location_id,
            category_id: req.category_id,
            image: req.image,
            is_published: req.is_published,
        };
        self.posts.create_post(new_post).await
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<OwnershipOutcome<Post>, DomainError> {
        // Ownership is checked against a fresh load, before any effect.
        // A non-owner is redirected before the body is even looked at,
        // so an invalid payload never surfaces an error to them.
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;
        if post.author_id != actor_user_id {
            return Ok(OwnershipOutcome::NotOwner { post_id });
        }

        let req = req.validate()?;

        let patch = PostPatch {
            title: req.title,
            text: req.text,
            pub_date: req.pub_date,
            location_id: req.location_id,
            category_id: req.category_id,
            image: req.image,
            is_published: req.is_published,
        };
        let updated = self
            .posts
            .update_post(post_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;

        Ok(OwnershipOutcome::Applied(updated))
    }

    pub(crate) async fn delete_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<OwnershipOutcome<()>, DomainError> {
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;
        if post.author_id != actor_user_id {
            return Ok(OwnershipOutcome::NotOwner { post_id });
        }

        let deleted = self.posts.delete_post(post_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }
        Ok(OwnershipOutcome::Applied(()))
    }

    /// Comments may be left on any existing post; visibility is not
    /// re-checked here, matching the original behavior.
    pub(crate) async fn add_comment(
        &self,
        author_id: i64,
        post_id: i64,
        req: CommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;

        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;

        let new_comment = NewComment {
            text: req.text,
            post_id: post.id,
            author_id,
        };
        self.comments.create_comment(new_comment).await
    }

    pub(crate) async fn update_comment(
        &self,
        actor_user_id: i64,
        comment_id: i64,
        req: CommentRequest,
    ) -> Result<OwnershipOutcome<Comment>, DomainError> {
        let comment = self
            .comments
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))?;
        if comment.author_id != actor_user_id {
            return Ok(OwnershipOutcome::NotOwner {
                post_id: comment.post_id,
            });
        }

        let req = req.validate()?;

        let updated = self
            .comments
            .update_comment(comment_id, req.text)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))?;

        Ok(OwnershipOutcome::Applied(updated))
    }

    pub(crate) async fn delete_comment(
        &self,
        actor_user_id: i64,
        comment_id: i64,
    ) -> Result<OwnershipOutcome<Comment>, DomainError> {
        let comment = self
            .comments
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))?;
        if comment.author_id != actor_user_id {
            return Ok(OwnershipOutcome::NotOwner {
                post_id: comment.post_id,
            });
        }

        let deleted = self.comments.delete_comment(comment_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("comment id: {comment_id}")));
        }
        Ok(OwnershipOutcome::Applied(comment))
    }

    pub(crate) async fn update_profile(
        &self,
        actor_user_id: i64,
        req: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        let req = req.validate()?;

        let patch = ProfilePatch {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
        };
        self.users
            .update_profile(actor_user_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {actor_user_id}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};

    use super::{BlogService, OwnershipOutcome};
    use crate::data::category_repository::CategoryRepository;
    use crate::data::comment_repository::{CommentRepository, NewComment};
    use crate::data::post_repository::{
        NewPost, Pagination, PostPatch, PostQuery, PostRepository, PostVisibility,
    };
    use crate::data::user_repository::{
        NewUser, ProfilePatch, UserCredentials, UserRepository,
    };
    use crate::domain::category::Category;
    use crate::domain::comment::{Comment, CommentRequest};
    use crate::domain::error::DomainError;
    use crate::domain::post::{AnnotatedPost, CategoryRef, Post, UpdatePostRequest};
    use crate::domain::user::User;

    const PAGE_SIZE: u32 = 10;

    #[derive(Clone, Default)]
    struct FakePostRepo {
        post_for_get: Arc<Mutex<Option<Post>>>,
        list_result: Arc<Mutex<Vec<AnnotatedPost>>>,
        total_result: Arc<Mutex<i64>>,
        list_query: Arc<Mutex<Option<PostQuery>>>,
        created_input: Arc<Mutex<Option<NewPost>>>,
        update_call: Arc<Mutex<Option<(i64, PostPatch)>>>,
        delete_call: Arc<Mutex<Option<i64>>>,
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
            let post = sample_post(1, input.author_id, true, input.pub_date, None);
            *self.created_input.lock().expect("mutex poisoned") = Some(input);
            Ok(post)
        }

        async fn get_post(&self, _id: i64) -> Result<Option<Post>, DomainError> {
            Ok(self.post_for_get.lock().expect("mutex poisoned").clone())
        }

        async fn update_post(
            &self,
            post_id: i64,
            patch: PostPatch,
        ) -> Result<Option<Post>, DomainError> {
            *self.update_call.lock().expect("mutex poisoned") = Some((post_id, patch));
            Ok(self.post_for_get.lock().expect("mutex poisoned").clone())
        }

        async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
            *self.delete_call.lock().expect("mutex poisoned") = Some(id);
            Ok(true)
        }

        async fn list_posts(
            &self,
            query: PostQuery,
            _pagination: Pagination,
        ) -> Result<Vec<AnnotatedPost>, DomainError> {
            *self.list_query.lock().expect("mutex poisoned") = Some(query);
            Ok(self.list_result.lock().expect("mutex poisoned").clone())
        }

        async fn count_posts(&self, _query: PostQuery) -> Result<i64, DomainError> {
            Ok(*self.total_result.lock().expect("mutex poisoned"))
        }
    }

    #[derive(Clone, Default)]
    struct FakeCommentRepo {
        comment_for_get: Arc<Mutex<Option<Comment>>>,
        list_result: Arc<Mutex<Vec<Comment>>>,
        created_input: Arc<Mutex<Option<NewComment>>>,
        update_call: Arc<Mutex<Option<(i64, String)>>>,
        delete_call: Arc<Mutex<Option<i64>>>,
    }

    #[async_trait]
    impl CommentRepository for FakeCommentRepo {
        async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
            let comment = sample_comment(5, input.post_id, input.author_id, &input.text);
            *self.created_input.lock().expect("mutex poisoned") = Some(input);
            Ok(comment)
        }

        async fn get_comment(&self, _id: i64) -> Result<Option<Comment>, DomainError> {
            Ok(self.comment_for_get.lock().expect("mutex poisoned").clone())
        }

        async fn update_comment(
            &self,
            id: i64,
            text: String,
        ) -> Result<Option<Comment>, DomainError> {
            *self.update_call.lock().expect("mutex poisoned") = Some((id, text));
            Ok(self.comment_for_get.lock().expect("mutex poisoned").clone())
        }

        async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
            *self.delete_call.lock().expect("mutex poisoned") = Some(id);
            Ok(true)
        }

        async fn list_for_post(&self, _post_id: i64) -> Result<Vec<Comment>, DomainError> {
            Ok(self.list_result.lock().expect("mutex poisoned").clone())
        }
    }

    #[derive(Clone, Default)]
    struct FakeCategoryRepo {
        category: Arc<Mutex<Option<Category>>>,
    }

    #[async_trait]
    impl CategoryRepository for FakeCategoryRepo {
        async fn find_by_slug(&self, _slug: &str) -> Result<Option<Category>, DomainError> {
            Ok(self.category.lock().expect("mutex poisoned").clone())
        }
    }

    #[derive(Clone, Default)]
    struct FakeUserRepo {
        profile: Arc<Mutex<Option<User>>>,
        update_call: Arc<Mutex<Option<(i64, ProfilePatch)>>>,
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn create_user(&self, _input: NewUser) -> Result<User, DomainError> {
            Err(DomainError::Unexpected("not used in these tests".to_string()))
        }

        async fn find_by_username(
            &self,
            _username: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            Ok(None)
        }

        async fn find_profile(&self, _username: &str) -> Result<Option<User>, DomainError> {
            Ok(self.profile.lock().expect("mutex poisoned").clone())
        }

        async fn update_profile(
            &self,
            user_id: i64,
            patch: ProfilePatch,
        ) -> Result<Option<User>, DomainError> {
            *self.update_call.lock().expect("mutex poisoned") = Some((user_id, patch));
            Ok(self.profile.lock().expect("mutex poisoned").clone())
        }
    }

    type TestService = BlogService<FakePostRepo, FakeCommentRepo, FakeCategoryRepo, FakeUserRepo>;

    fn service(
        posts: FakePostRepo,
        comments: FakeCommentRepo,
        categories: FakeCategoryRepo,
        users: FakeUserRepo,
    ) -> TestService {
        BlogService::new(posts, comments, categories, users, PAGE_SIZE)
    }

    fn sample_post(
        id: i64,
        author_id: i64,
        is_published: bool,
        pub_date: DateTime<Utc>,
        category: Option<CategoryRef>,
    ) -> Post {
        Post::new(
            id,
            "Title",
            "Text",
            pub_date,
            author_id,
            None,
            category,
            None,
            is_published,
            Utc::now(),
        )
        .expect("sample post must be valid")
    }

    fn sample_comment(id: i64, post_id: i64, author_id: i64, text: &str) -> Comment {
        Comment::new(id, text, post_id, author_id, Utc::now())
            .expect("sample comment must be valid")
    }

    fn sample_user(id: i64, username: &str) -> User {
        User::new(id, username, "user@example.com", "", "", Utc::now())
            .expect("sample user must be valid")
    }

    fn sample_category(id: i64, slug: &str, is_published: bool) -> Category {
        Category::new(id, "Travel", "posts about travel", slug, is_published, Utc::now())
            .expect("sample category must be valid")
    }

    #[tokio::test]
    async fn public_list_composes_visibility_filter() {
        let posts = FakePostRepo::default();
        let svc = service(
            posts.clone(),
            FakeCommentRepo::default(),
            FakeCategoryRepo::default(),
            FakeUserRepo::default(),
        );
        let now = Utc::now();

        let page = svc
            .list_public_posts(now, 1)
            .await
            .expect("list must succeed");
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, PAGE_SIZE);

        let query = posts
            .list_query
            .lock()
            .expect("mutex poisoned")
            .expect("query must be captured");
        assert_eq!(query.author_id, None);
        assert_eq!(query.category_id, None);
        assert!(matches!(query.visibility, PostVisibility::PublicAt(t) if t == now));
    }

    #[tokio::test]
    async fn own_profile_skips_visibility_filter() {
        let posts = FakePostRepo::default();
        let users = FakeUserRepo::default();
        *users.profile.lock().expect("mutex poisoned") = Some(sample_user(10, "max"));

        let svc = service(
            posts.clone(),
            FakeCommentRepo::default(),
            FakeCategoryRepo::default(),
            users,
        );

        let page = svc
            .profile_posts("max", Some(10), Utc::now(), 1)
            .await
            .expect("profile must resolve");
        assert_eq!(page.profile.id, 10);

        let query = posts
            .list_query
            .lock()
            .expect("mutex poisoned")
            .expect("query must be captured");
        assert_eq!(query.author_id, Some(10));
        assert!(matches!(query.visibility, PostVisibility::All));
    }

    #[tokio::test]
    async fn foreign_profile_keeps_visibility_filter() {
        let posts = FakePostRepo::default();
        let users = FakeUserRepo::default();
        *users.profile.lock().expect("mutex poisoned") = Some(sample_user(10, "max"));

        let svc = service(
            posts.clone(),
            FakeCommentRepo::default(),
            FakeCategoryRepo::default(),
            users,
        );

        svc.profile_posts("max", Some(99), Utc::now(), 1)
            .await
            .expect("profile must resolve");

        let query = posts
            .list_query
            .lock()
            .expect("mutex poisoned")
            .expect("query must be captured");
        assert_eq!(query.author_id, Some(10));
        assert!(matches!(query.visibility, PostVisibility::PublicAt(_)));
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let svc = service(
            FakePostRepo::default(),
            FakeCommentRepo::default(),
            FakeCategoryRepo::default(),
            FakeUserRepo::default(),
        );

        let err = svc
            .profile_posts("ghost", None, Utc::now(), 1)
            .await
            .expect_err("must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn category_page_requires_published_category() {
        let categories = FakeCategoryRepo::default();
        *categories.category.lock().expect("mutex poisoned") =
            Some(sample_category(3, "travel", false));

        let svc = service(
            FakePostRepo::default(),
            FakeCommentRepo::default(),
            categories,
            FakeUserRepo::default(),
        );

        let err = svc
            .list_category_posts("travel", Utc::now(), 1)
            .await
            .expect_err("hidden category must look absent");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn category_page_filters_by_category_id() {
        let posts = FakePostRepo::default();
        let categories = FakeCategoryRepo::default();
        *categories.category.lock().expect("mutex poisoned") =
            Some(sample_category(3, "travel", true));

        let svc = service(
            posts.clone(),
            FakeCommentRepo::default(),
            categories,
            FakeUserRepo::default(),
        );

        let page = svc
            .list_category_posts("travel", Utc::now(), 1)
            .await
            .expect("category page must resolve");
        assert_eq!(page.category.slug, "travel");

        let query = posts
            .list_query
            .lock()
            .expect("mutex poisoned")
            .expect("query must be captured");
        assert_eq!(query.category_id, Some(3));
        assert!(matches!(query.visibility, PostVisibility::PublicAt(_)));
    }

    #[tokio::test]
    async fn invisible_post_detail_is_not_found_for_strangers() {
        let now = Utc::now();
        let posts = FakePostRepo::default();
        // Future-dated post: only its author may open it.
        *posts.post_for_get.lock().expect("mutex poisoned") =
            Some(sample_post(1, 10, true, now + Duration::days(1), None));

        let svc = service(
            posts,
            FakeCommentRepo::default(),
            FakeCategoryRepo::default(),
            FakeUserRepo::default(),
        );

        let err = svc
            .get_post(1, Some(99), now)
            .await
            .expect_err("stranger must see not-found");
        assert!(matches!(err, DomainError::NotFound(_)));

        let detail = svc
            .get_post(1, Some(10), now)
            .await
            .expect("author must see own post");
        assert_eq!(detail.post.id, 1);
    }

    #[tokio::test]
    async fn post_detail_includes_comments() {
        let now = Utc::now();
        let posts = FakePostRepo::default();
        *posts.post_for_get.lock().expect("mutex poisoned") =
            Some(sample_post(1, 10, true, now - Duration::days(1), None));
        let comments = FakeCommentRepo::default();
        *comments.list_result.lock().expect("mutex poisoned") =
            vec![sample_comment(5, 1, 20, "hi")];

        let svc = service(
            posts,
            comments,
            FakeCategoryRepo::default(),
            FakeUserRepo::default(),
        );

        let detail = svc.get_post(1, None, now).await.expect("must resolve");
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].post_id, 1);
    }

    #[tokio::test]
    async fn update_post_by_non_owner_redirects_without_mutation() {
        let now = Utc::now();
        let posts = FakePostRepo::default();
        *posts.post_for_get.lock().expect("mutex poisoned") =
            Some(sample_post(7, 10, true, now, None));

        let svc = service(
            posts.clone(),
            FakeCommentRepo::default(),
            FakeCategoryRepo::default(),
            FakeUserRepo::default(),
        );

        let req = UpdatePostRequest {
            title: "new".to_string(),
            text: "body".to_string(),
            pub_date: now,
            location_id: None,
            category_id: None,
            image: None,
            is_published: true,
        };
        let outcome = svc
            .update_post(99, 7, req)
            .await
            .expect("check itself must succeed");

        assert!(matches!(outcome, OwnershipOutcome::NotOwner { post_id: 7 }));
        assert!(
            posts.update_call.lock().expect("mutex poisoned").is_none(),
            "repository must not be touched on a failed ownership check"
        );
    }

    #[tokio::test]
    async fn update_post_by_non_owner_with_invalid_body_still_redirects() {
        let now = Utc::now();
        let posts = FakePostRepo::default();
        *posts.post_for_get.lock().expect("mutex poisoned") =
            Some(sample_post(7, 10, true, now, None));

        let svc = service(
            posts.clone(),
            FakeCommentRepo::default(),
            FakeCategoryRepo::default(),
            FakeUserRepo::default(),
        );

        // Blank title would fail validation, but a non-owner must never
        // see that error: the ownership check redirects first.
        let req = UpdatePostRequest {
            title: "   ".to_string(),
            text: "body".to_string(),
            pub_date: now,
            location_id: None,
            category_id: None,
            image: None,
            is_published: true,
        };
        let outcome = svc
            .update_post(99, 7, req)
            .await
            .expect("non-owner must not surface a validation error");

        assert!(matches!(outcome, OwnershipOutcome::NotOwner { post_id: 7 }));
        assert!(posts.update_call.lock().expect("mutex poisoned").is_none());
    }

    #[tokio::test]
    async fn update_post_by_owner_still_validates_body() {
        let now = Utc::now();
        let posts = FakePostRepo::default();
        *posts.post_for_get.lock().expect("mutex poisoned") =
            Some(sample_post(7, 10, true, now, None));

        let svc = service(
            posts.clone(),
            FakeCommentRepo::default(),
            FakeCategoryRepo::default(),
            FakeUserRepo::default(),
        );

        let req = UpdatePostRequest {
            title: "   ".to_string(),
            text: "body".to_string(),
            pub_date: now,
            location_id: None,
            category_id: None,
            image: None,
            is_published: true,
        };
        let err = svc
            .update_post(10, 7, req)
            .await
            .expect_err("owner with a blank title must fail validation");

        assert!(matches!(err, DomainError::Validation { field: "title", .. }));
        assert!(posts.update_call.lock().expect("mutex poisoned").is_none());
    }

    #[tokio::test]
    async fn delete_post_by_owner_is_applied() {
        let now = Utc::now();
        let posts = FakePostRepo::default();
        *posts.post_for_get.lock().expect("mutex poisoned") =
            Some(sample_post(7, 10, true, now, None));

        let svc = service(
            posts.clone(),
            FakeCommentRepo::default(),
            FakeCategoryRepo::default(),
            FakeUserRepo::default(),
        );

        let outcome = svc.delete_post(10, 7).await.expect("delete must succeed");
        assert!(matches!(outcome, OwnershipOutcome::Applied(())));
        assert_eq!(*posts.delete_call.lock().expect("mutex poisoned"), Some(7));
    }

    #[tokio::test]
    async fn delete_post_by_non_owner_redirects_without_mutation() {
        let now = Utc::now();
        let posts = FakePostRepo::default();
        *posts.post_for_get.lock().expect("mutex poisoned") =
            Some(sample_post(7, 10, true, now, None));

        let svc = service(
            posts.clone(),
            FakeCommentRepo::default(),
            FakeCategoryRepo::default(),
            FakeUserRepo::default(),
        );

        let outcome = svc.delete_post(99, 7).await.expect("check must succeed");
        assert!(matches!(outcome, OwnershipOutcome::NotOwner { post_id: 7 }));
        assert!(posts.delete_call.lock().expect("mutex poisoned").is_none());
    }

    #[tokio::test]
    async fn add_comment_persists_author_and_post() {
        let now = Utc::now();
        let posts = FakePostRepo::default();
        *posts.post_for_get.lock().expect("mutex poisoned") =
            Some(sample_post(1, 10, true, now, None));
        let comments = FakeCommentRepo::default();

        let svc = service(
            posts,
            comments.clone(),
            FakeCategoryRepo::default(),
            FakeUserRepo::default(),
        );

        let comment = svc
            .add_comment(
                20,
                1,
                CommentRequest {
                    text: "  nice post  ".to_string(),
                },
            )
            .await
            .expect("comment must be created");

        assert_eq!(comment.post_id, 1);
        assert_eq!(comment.author_id, 20);

        let input = comments
            .created_input
            .lock()
            .expect("mutex poisoned")
            .clone()
            .expect("input must be captured");
        assert_eq!(input.text, "nice post");
    }

    #[tokio::test]
    async fn add_comment_to_missing_post_is_not_found() {
        let svc = service(
            FakePostRepo::default(),
            FakeCommentRepo::default(),
            FakeCategoryRepo::default(),
            FakeUserRepo::default(),
        );

        let err = svc
            .add_comment(
                20,
                404,
                CommentRequest {
                    text: "hello".to_string(),
                },
            )
            .await
            .expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn comment_mutation_by_non_owner_redirects_to_parent_post() {
        let comments = FakeCommentRepo::default();
        *comments.comment_for_get.lock().expect("mutex poisoned") =
            Some(sample_comment(5, 1, 20, "hi"));

        let svc = service(
            FakePostRepo::default(),
            comments.clone(),
            FakeCategoryRepo::default(),
            FakeUserRepo::default(),
        );

        let outcome = svc
            .delete_comment(99, 5)
            .await
            .expect("check must succeed");
        assert!(matches!(outcome, OwnershipOutcome::NotOwner { post_id: 1 }));
        assert!(comments.delete_call.lock().expect("mutex poisoned").is_none());

        let outcome = svc
            .update_comment(
                99,
                5,
                CommentRequest {
                    text: "edited".to_string(),
                },
            )
            .await
            .expect("check must succeed");
        assert!(matches!(outcome, OwnershipOutcome::NotOwner { post_id: 1 }));
        assert!(comments.update_call.lock().expect("mutex poisoned").is_none());
    }

    #[tokio::test]
    async fn update_comment_by_non_owner_with_invalid_body_still_redirects() {
        let comments = FakeCommentRepo::default();
        *comments.comment_for_get.lock().expect("mutex poisoned") =
            Some(sample_comment(5, 1, 20, "hi"));

        let svc = service(
            FakePostRepo::default(),
            comments.clone(),
            FakeCategoryRepo::default(),
            FakeUserRepo::default(),
        );

        let outcome = svc
            .update_comment(
                99,
                5,
                CommentRequest {
                    text: "   ".to_string(),
                },
            )
            .await
            .expect("non-owner must not surface a validation error");

        assert!(matches!(outcome, OwnershipOutcome::NotOwner { post_id: 1 }));
        assert!(comments.update_call.lock().expect("mutex poisoned").is_none());
    }

    #[tokio::test]
    async fn update_comment_by_owner_is_applied() {
        let comments = FakeCommentRepo::default();
        *comments.comment_for_get.lock().expect("mutex poisoned") =
            Some(sample_comment(5, 1, 20, "hi"));

        let svc = service(
            FakePostRepo::default(),
            comments.clone(),
            FakeCategoryRepo::default(),
            FakeUserRepo::default(),
        );

        let outcome = svc
            .update_comment(
                20,
                5,
                CommentRequest {
                    text: "  edited  ".to_string(),
                },
            )
            .await
            .expect("update must succeed");
        assert!(matches!(outcome, OwnershipOutcome::Applied(_)));

        let call = comments
            .update_call
            .lock()
            .expect("mutex poisoned")
            .clone()
            .expect("update must be captured");
        assert_eq!(call.0, 5);
        assert_eq!(call.1, "edited");
    }

    #[tokio::test]
    async fn update_profile_normalizes_and_patches_actor() {
        let users = FakeUserRepo::default();
        *users.profile.lock().expect("mutex poisoned") = Some(sample_user(10, "max"));

        let svc = service(
            FakePostRepo::default(),
            FakeCommentRepo::default(),
            FakeCategoryRepo::default(),
            users.clone(),
        );

        let req = crate::domain::user::UpdateProfileRequest {
            username: "  max  ".to_string(),
            email: "MAX@example.com".to_string(),
            first_name: " Max ".to_string(),
            last_name: "K".to_string(),
        };
        svc.update_profile(10, req).await.expect("must succeed");

        let call = users
            .update_call
            .lock()
            .expect("mutex poisoned")
            .clone()
            .expect("patch must be captured");
        assert_eq!(call.0, 10);
        assert_eq!(call.1.username, "max");
        assert_eq!(call.1.email, "max@example.com");
    }
}
