//! Post handlers: detail, create, edit, delete.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use blogicum_core::domain::Post;
use blogicum_core::policy;
use blogicum_shared::dto::{PostDetailResponse, PostForm};

use crate::handlers::{post_url, profile_url, render, see_other, validate};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn load_post(state: &AppState, id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {id}")))
}

/// Whether `post` is visible to `viewer` right now. The category row is
/// guaranteed to exist by the FK, so its absence is an internal error.
pub(crate) async fn check_visible(
    state: &AppState,
    post: &Post,
    viewer: Option<Uuid>,
) -> AppResult<bool> {
    let category = state
        .categories
        .find_by_id(post.category_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("category {} missing", post.category_id)))?;

    Ok(policy::visible(post, category.is_published, viewer, Utc::now()))
}

/// Field validation shared by create and edit.
async fn validate_form(state: &AppState, form: &PostForm) -> AppResult<()> {
    let mut errors = validate::FieldErrors::new();

    validate::require(&mut errors, "title", &form.title);
    validate::max_len(&mut errors, "title", &form.title, 256);
    validate::require(&mut errors, "text", &form.text);

    if state.categories.find_by_id(form.category_id).await?.is_none() {
        errors.push("category", "Select a valid category.");
    }
    if let Some(location_id) = form.location_id {
        if state.locations.find_by_id(location_id).await?.is_none() {
            errors.push("location", "Select a valid location.");
        }
    }

    errors.into_result()
}

/// GET /posts/{id}/ - the post plus its comments, oldest first.
pub async fn detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = load_post(&state, id).await?;

    if !check_visible(&state, &post, viewer.user_id()).await? {
        // Hidden posts are indistinguishable from missing ones.
        return Err(AppError::NotFound(format!("post {id}")));
    }

    let comments = state.comments.list_for_post(post.id).await?;
    let authors = render::usernames(
        &state,
        comments
            .iter()
            .map(|c| c.author_id)
            .chain(std::iter::once(post.author_id)),
    )
    .await?;

    let post_author = authors.get(&post.author_id).cloned().unwrap_or_default();
    let comment_count = comments.len() as u64;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        comments: comments
            .into_iter()
            .map(|comment| {
                let author = authors.get(&comment.author_id).cloned().unwrap_or_default();
                render::comment_response(comment, author)
            })
            .collect(),
        post: render::post_response(post, post_author, Some(comment_count)),
    }))
}

/// POST /posts/create/ - auth required; the viewer becomes the author.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let form = body.into_inner();
    validate_form(&state, &form).await?;

    let mut post = Post::new(
        identity.user_id,
        form.category_id,
        form.title,
        form.text,
        form.pub_date,
    );
    post.location_id = form.location_id;
    post.image = form.image;
    post.is_published = form.is_published;

    let saved = state.posts.insert(post).await?;
    tracing::info!(post_id = %saved.id, author = %identity.username, "Post created");

    Ok(see_other(post_url(saved.id)))
}

/// GET /posts/{id}/edit/ - current values for the edit form, author only.
/// Non-authors are sent to the detail page, same as the POST half.
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = load_post(&state, id).await?;

    if !policy::owns(&post, identity.user_id) {
        return Err(AppError::Redirect(post_url(id)));
    }

    Ok(HttpResponse::Ok().json(render::post_response(post, identity.username, None)))
}

/// POST /posts/{id}/edit/ - author only; non-authors are sent back to the
/// detail page without any write.
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut post = load_post(&state, id).await?;

    if !policy::owns(&post, identity.user_id) {
        return Err(AppError::Redirect(post_url(id)));
    }

    let form = body.into_inner();
    validate_form(&state, &form).await?;

    post.title = form.title;
    post.text = form.text;
    post.pub_date = form.pub_date;
    post.category_id = form.category_id;
    post.location_id = form.location_id;
    post.image = form.image;
    post.is_published = form.is_published;

    let saved = state.posts.update(post).await?;

    Ok(see_other(post_url(saved.id)))
}

/// POST /posts/{id}/delete/ - author only; comments go with the post.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = load_post(&state, id).await?;

    if !policy::owns(&post, identity.user_id) {
        return Err(AppError::Redirect(post_url(id)));
    }

    state.posts.delete(post.id).await?;
    tracing::info!(post_id = %id, author = %identity.username, "Post deleted");

    Ok(see_other(profile_url(&identity.username)))
}
