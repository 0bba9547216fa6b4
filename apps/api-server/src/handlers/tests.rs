use std::sync::{Arc, Mutex};

use actix_web::{body::to_bytes, web};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Location, Post, PostPreview, User};
use blogicum_core::error::RepoError;
use blogicum_core::policy::{self, Page, PageMeta};
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    UserRepository,
};
use blogicum_shared::dto::{CommentForm, PostForm};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppError;
use crate::state::AppState;

use super::{PageQuery, comments, feed, post_url, posts, profile};

/// In-memory stand-in for the database, shared by all repository fakes
/// so cross-aggregate reads (category publication, comment counts) see
/// the same rows.
#[derive(Default)]
struct MemDb {
    users: Mutex<Vec<User>>,
    posts: Mutex<Vec<Post>>,
    comments: Mutex<Vec<Comment>>,
    categories: Mutex<Vec<Category>>,
    locations: Mutex<Vec<Location>>,
}

impl MemDb {
    fn category_published(&self, id: Uuid) -> bool {
        self.categories
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.id == id && c.is_published)
    }

    fn page_of(&self, mut posts: Vec<Post>, requested: u64) -> Page<PostPreview> {
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        let total_pages = (posts.len() as u64).div_ceil(policy::PAGE_SIZE);
        let number = policy::clamp_page(requested, total_pages);

        let comments = self.comments.lock().unwrap();
        let items = posts
            .into_iter()
            .skip(((number - 1) * policy::PAGE_SIZE) as usize)
            .take(policy::PAGE_SIZE as usize)
            .map(|post| {
                let comment_count =
                    comments.iter().filter(|c| c.post_id == post.id).count() as u64;
                PostPreview {
                    post,
                    comment_count,
                }
            })
            .collect();

        Page {
            items,
            meta: PageMeta::new(number, total_pages),
        }
    }
}

struct MemUsers(Arc<MemDb>);
struct MemPosts(Arc<MemDb>);
struct MemComments(Arc<MemDb>);
struct MemCategories(Arc<MemDb>);
struct MemLocations(Arc<MemDb>);

macro_rules! mem_crud {
    ($repo:ident, $field:ident, $ty:ty) => {
        #[async_trait]
        impl BaseRepository<$ty, Uuid> for $repo {
            async fn find_by_id(&self, id: Uuid) -> Result<Option<$ty>, RepoError> {
                Ok(self
                    .0
                    .$field
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|row| row.id == id)
                    .cloned())
            }

            async fn insert(&self, entity: $ty) -> Result<$ty, RepoError> {
                self.0.$field.lock().unwrap().push(entity.clone());
                Ok(entity)
            }

            async fn update(&self, entity: $ty) -> Result<$ty, RepoError> {
                let mut rows = self.0.$field.lock().unwrap();
                let slot = rows
                    .iter_mut()
                    .find(|row| row.id == entity.id)
                    .ok_or(RepoError::NotFound)?;
                *slot = entity.clone();
                Ok(entity)
            }

            async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
                self.0.$field.lock().unwrap().retain(|row| row.id != id);
                Ok(())
            }
        }
    };
}

mem_crud!(MemUsers, users, User);
mem_crud!(MemPosts, posts, Post);
mem_crud!(MemComments, comments, Comment);
mem_crud!(MemCategories, categories, Category);
mem_crud!(MemLocations, locations, Location);

#[async_trait]
impl UserRepository for MemUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl CategoryRepository for MemCategories {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        Ok(self
            .0
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.slug == slug && c.is_published)
            .cloned())
    }
}

impl LocationRepository for MemLocations {}

#[async_trait]
impl PostRepository for MemPosts {
    async fn home_feed(
        &self,
        now: DateTime<Utc>,
        page: u64,
    ) -> Result<Page<PostPreview>, RepoError> {
        let posts: Vec<Post> = self
            .0
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| policy::visible(p, self.0.category_published(p.category_id), None, now))
            .cloned()
            .collect();
        Ok(self.0.page_of(posts, page))
    }

    async fn category_feed(
        &self,
        category_id: Uuid,
        now: DateTime<Utc>,
        page: u64,
    ) -> Result<Page<PostPreview>, RepoError> {
        let posts: Vec<Post> = self
            .0
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.category_id == category_id)
            .filter(|p| policy::visible(p, self.0.category_published(p.category_id), None, now))
            .cloned()
            .collect();
        Ok(self.0.page_of(posts, page))
    }

    async fn author_feed(
        &self,
        author_id: Uuid,
        include_hidden: bool,
        now: DateTime<Utc>,
        page: u64,
    ) -> Result<Page<PostPreview>, RepoError> {
        let posts: Vec<Post> = self
            .0
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.author_id == author_id)
            .filter(|p| {
                include_hidden
                    || policy::visible(p, self.0.category_published(p.category_id), None, now)
            })
            .cloned()
            .collect();
        Ok(self.0.page_of(posts, page))
    }
}

#[async_trait]
impl CommentRepository for MemComments {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let mut rows: Vec<Comment> = self
            .0
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn find_scoped(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, RepoError> {
        Ok(self
            .0
            .comments
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == comment_id && c.post_id == post_id)
            .cloned())
    }
}

fn mem_state() -> (web::Data<AppState>, Arc<MemDb>) {
    let db = Arc::new(MemDb::default());
    let state = AppState {
        users: Arc::new(MemUsers(db.clone())),
        posts: Arc::new(MemPosts(db.clone())),
        comments: Arc::new(MemComments(db.clone())),
        categories: Arc::new(MemCategories(db.clone())),
        locations: Arc::new(MemLocations(db.clone())),
    };
    (web::Data::new(state), db)
}

fn seed_user(db: &MemDb, username: &str) -> User {
    let user = User::new(username.to_owned(), "hash".to_owned());
    db.users.lock().unwrap().push(user.clone());
    user
}

fn seed_category(db: &MemDb) -> Category {
    let category = Category::new("Travel".to_owned(), "On the road".to_owned(), "travel".to_owned());
    db.categories.lock().unwrap().push(category.clone());
    category
}

fn seed_post(db: &MemDb, author: &User, category: &Category) -> Post {
    let post = Post::new(
        author.id,
        category.id,
        "Old title".to_owned(),
        "Body".to_owned(),
        Utc::now() - TimeDelta::hours(1),
    );
    db.posts.lock().unwrap().push(post.clone());
    post
}

fn as_identity(user: &User) -> Identity {
    Identity {
        user_id: user.id,
        username: user.username.clone(),
    }
}

fn edit_form_for(post: &Post, title: &str) -> PostForm {
    PostForm {
        title: title.to_owned(),
        text: post.text.clone(),
        pub_date: post.pub_date,
        category_id: post.category_id,
        location_id: None,
        image: None,
        is_published: post.is_published,
    }
}

async fn body_json(resp: actix_web::HttpResponse) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_non_author_edit_redirects_without_writing() {
    let (state, db) = mem_state();
    let author = seed_user(&db, "author");
    let intruder = seed_user(&db, "intruder");
    let category = seed_category(&db);
    let post = seed_post(&db, &author, &category);

    let result = posts::edit(
        state,
        as_identity(&intruder),
        web::Path::from(post.id),
        web::Json(edit_form_for(&post, "Hijacked")),
    )
    .await;

    match result {
        Err(AppError::Redirect(location)) => assert_eq!(location, post_url(post.id)),
        other => panic!("expected redirect, got {other:?}"),
    }

    let stored = db.posts.lock().unwrap()[0].clone();
    assert_eq!(stored.title, "Old title");
}

#[tokio::test]
async fn test_non_author_delete_redirects_and_keeps_post() {
    let (state, db) = mem_state();
    let author = seed_user(&db, "author");
    let intruder = seed_user(&db, "intruder");
    let category = seed_category(&db);
    let post = seed_post(&db, &author, &category);

    let result = posts::delete(state, as_identity(&intruder), web::Path::from(post.id)).await;

    match result {
        Err(AppError::Redirect(location)) => assert_eq!(location, post_url(post.id)),
        other => panic!("expected redirect, got {other:?}"),
    }

    assert_eq!(db.posts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_edit_form_is_owner_only() {
    let (state, db) = mem_state();
    let author = seed_user(&db, "author");
    let intruder = seed_user(&db, "intruder");
    let category = seed_category(&db);
    let post = seed_post(&db, &author, &category);

    let result = posts::edit_form(
        state.clone(),
        as_identity(&intruder),
        web::Path::from(post.id),
    )
    .await;

    match result {
        Err(AppError::Redirect(location)) => assert_eq!(location, post_url(post.id)),
        other => panic!("expected redirect, got {other:?}"),
    }

    let resp = posts::edit_form(state, as_identity(&author), web::Path::from(post.id))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["title"], "Old title");
}

#[tokio::test]
async fn test_comment_on_hidden_post_is_not_found() {
    let (state, db) = mem_state();
    let author = seed_user(&db, "author");
    let reader = seed_user(&db, "reader");
    let category = seed_category(&db);

    let mut post = Post::new(
        author.id,
        category.id,
        "Draft".to_owned(),
        "Not yet".to_owned(),
        Utc::now() - TimeDelta::hours(1),
    );
    post.is_published = false;
    db.posts.lock().unwrap().push(post.clone());

    let result = comments::create(
        state,
        as_identity(&reader),
        web::Path::from(post.id),
        web::Json(CommentForm {
            text: "First!".to_owned(),
        }),
    )
    .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(db.comments.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_author_may_comment_on_own_hidden_post() {
    let (state, db) = mem_state();
    let author = seed_user(&db, "author");
    let category = seed_category(&db);

    let mut post = Post::new(
        author.id,
        category.id,
        "Draft".to_owned(),
        "Not yet".to_owned(),
        Utc::now() - TimeDelta::hours(1),
    );
    post.is_published = false;
    db.posts.lock().unwrap().push(post.clone());

    let result = comments::create(
        state,
        as_identity(&author),
        web::Path::from(post.id),
        web::Json(CommentForm {
            text: "Note to self".to_owned(),
        }),
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(db.comments.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_comment_edit_by_non_author_redirects_without_writing() {
    let (state, db) = mem_state();
    let author = seed_user(&db, "author");
    let intruder = seed_user(&db, "intruder");
    let category = seed_category(&db);
    let post = seed_post(&db, &author, &category);

    let comment = Comment::new(post.id, author.id, "original".to_owned());
    db.comments.lock().unwrap().push(comment.clone());

    let result = comments::edit(
        state,
        as_identity(&intruder),
        web::Path::from((post.id, comment.id)),
        web::Json(CommentForm {
            text: "defaced".to_owned(),
        }),
    )
    .await;

    match result {
        Err(AppError::Redirect(location)) => assert_eq!(location, post_url(post.id)),
        other => panic!("expected redirect, got {other:?}"),
    }

    assert_eq!(db.comments.lock().unwrap()[0].text, "original");
}

#[tokio::test]
async fn test_scheduled_post_shows_only_in_authors_own_profile() {
    let (state, db) = mem_state();
    let author = seed_user(&db, "planner");
    let category = seed_category(&db);

    db.posts.lock().unwrap().push(Post::new(
        author.id,
        category.id,
        "Later".to_owned(),
        "Soon".to_owned(),
        Utc::now() + TimeDelta::days(2),
    ));

    // Absent from the home feed.
    let resp = feed::index(state.clone(), web::Query(PageQuery { page: 1 }))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert!(json["items"].as_array().unwrap().is_empty());

    // Present when the author browses their own profile.
    let resp = profile::detail(
        state.clone(),
        OptionalIdentity(Some(as_identity(&author))),
        web::Path::from(author.username.clone()),
        web::Query(PageQuery { page: 1 }),
    )
    .await
    .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["posts"]["items"].as_array().unwrap().len(), 1);

    // Absent for everyone else on the same profile.
    let resp = profile::detail(
        state,
        OptionalIdentity(None),
        web::Path::from(author.username.clone()),
        web::Query(PageQuery { page: 1 }),
    )
    .await
    .unwrap();
    let json = body_json(resp).await;
    assert!(json["posts"]["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_public_profile_payload_has_no_email() {
    let (state, db) = mem_state();
    let mut user = User::new("letterbox".to_owned(), "hash".to_owned());
    user.email = Some("box@example.com".to_owned());
    db.users.lock().unwrap().push(user.clone());

    let resp = profile::detail(
        state,
        OptionalIdentity(None),
        web::Path::from(user.username.clone()),
        web::Query(PageQuery { page: 1 }),
    )
    .await
    .unwrap();

    let json = body_json(resp).await;
    assert_eq!(json["profile"]["username"], "letterbox");
    assert!(json["profile"].get("email").is_none());
}
