//! PostgreSQL repository implementations.
//!
//! Feed queries are where the visibility rule from `blogicum_core::policy`
//! is rendered as SQL: [`publicly_visible`] is the one query-level
//! translation of [`blogicum_core::policy::visible`], and every listing
//! goes through it.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Post, PostPreview, User};
use blogicum_core::error::RepoError;
use blogicum_core::policy::{self, Page, PageMeta};
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};

use super::entity::category::Entity as CategoryEntity;
use super::entity::comment::Entity as CommentEntity;
use super::entity::location::Entity as LocationEntity;
use super::entity::post::Entity as PostEntity;
use super::entity::user::Entity as UserEntity;
use super::entity::{category, comment, post, user};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .filter(category::Column::IsPublished.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

impl LocationRepository for PostgresLocationRepository {}

/// The non-author half of the visibility rule as a SQL condition.
/// Callers must join the category table. The author bypass never appears
/// here: profile feeds handle it by skipping this condition.
pub(crate) fn publicly_visible(now: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(post::Column::IsPublished.eq(true))
        .add(post::Column::PubDate.lte(now))
        .add(category::Column::IsPublished.eq(true))
}

#[derive(FromQueryResult)]
struct CommentTally {
    post_id: Uuid,
    count: i64,
}

impl PostgresPostRepository {
    /// Run a feed query through the paginator: clamp the requested page,
    /// fetch it, and annotate each post with its comment count.
    async fn feed_page(
        &self,
        query: Select<PostEntity>,
        requested: u64,
    ) -> Result<Page<PostPreview>, RepoError> {
        let paginator = query.paginate(&self.db, policy::PAGE_SIZE);
        let total_pages = paginator.num_pages().await.map_err(map_db_err)?;

        let number = policy::clamp_page(requested, total_pages);
        // fetch_page is zero-based
        let models = paginator.fetch_page(number - 1).await.map_err(map_db_err)?;

        let posts: Vec<Post> = models.into_iter().map(Into::into).collect();
        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let counts = self.comment_counts(&ids).await?;

        let items = posts
            .into_iter()
            .map(|post| {
                let comment_count = counts.get(&post.id).copied().unwrap_or(0);
                PostPreview {
                    post,
                    comment_count,
                }
            })
            .collect();

        Ok(Page {
            items,
            meta: PageMeta::new(number, total_pages),
        })
    }

    /// One grouped count query over the page's post ids.
    async fn comment_counts(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = CommentEntity::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(comment::Column::Id.count(), "count")
            .filter(comment::Column::PostId.is_in(ids.iter().copied()))
            .group_by(comment::Column::PostId)
            .into_model::<CommentTally>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| (row.post_id, row.count as u64))
            .collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn home_feed(
        &self,
        now: DateTime<Utc>,
        page: u64,
    ) -> Result<Page<PostPreview>, RepoError> {
        let query = PostEntity::find()
            .inner_join(CategoryEntity)
            .filter(publicly_visible(now))
            .order_by_desc(post::Column::PubDate);

        self.feed_page(query, page).await
    }

    async fn category_feed(
        &self,
        category_id: Uuid,
        now: DateTime<Utc>,
        page: u64,
    ) -> Result<Page<PostPreview>, RepoError> {
        let query = PostEntity::find()
            .inner_join(CategoryEntity)
            .filter(post::Column::CategoryId.eq(category_id))
            .filter(publicly_visible(now))
            .order_by_desc(post::Column::PubDate);

        self.feed_page(query, page).await
    }

    async fn author_feed(
        &self,
        author_id: Uuid,
        include_hidden: bool,
        now: DateTime<Utc>,
        page: u64,
    ) -> Result<Page<PostPreview>, RepoError> {
        let query = if include_hidden {
            // The author browsing their own profile sees everything,
            // unpublished and scheduled posts included.
            PostEntity::find().filter(post::Column::AuthorId.eq(author_id))
        } else {
            PostEntity::find()
                .inner_join(CategoryEntity)
                .filter(post::Column::AuthorId.eq(author_id))
                .filter(publicly_visible(now))
        }
        .order_by_desc(post::Column::PubDate);

        self.feed_page(query, page).await
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_scoped(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, RepoError> {
        let result = CommentEntity::find_by_id(comment_id)
            .filter(comment::Column::PostId.eq(post_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}
