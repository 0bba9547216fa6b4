//! Comment handlers: create under a post, edit and delete scoped to it.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_core::domain::Comment;
use blogicum_core::policy;
use blogicum_shared::dto::CommentForm;

use crate::handlers::{post_url, posts, see_other, validate};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn validate_text(text: &str) -> AppResult<()> {
    let mut errors = validate::FieldErrors::new();
    validate::require(&mut errors, "text", text);
    errors.into_result()
}

/// POST /posts/{post_id}/comment/ - auth required.
///
/// The target post is resolved through the visibility rule: you cannot
/// comment on a post you cannot see, even via direct URL.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;

    if !posts::check_visible(&state, &post, Some(identity.user_id)).await? {
        return Err(AppError::NotFound(format!("post {post_id}")));
    }

    let form = body.into_inner();
    validate_text(&form.text)?;

    let comment = Comment::new(post.id, identity.user_id, form.text);
    state.comments.insert(comment).await?;

    Ok(see_other(post_url(post.id)))
}

/// POST /posts/{post_id}/comment/{comment_id}/edit/ - comment author only.
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    let mut comment = state
        .comments
        .find_scoped(post_id, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("comment {comment_id}")))?;

    if !policy::owns(&comment, identity.user_id) {
        return Err(AppError::Redirect(post_url(post_id)));
    }

    let form = body.into_inner();
    validate_text(&form.text)?;

    comment.text = form.text;
    state.comments.update(comment).await?;

    Ok(see_other(post_url(post_id)))
}

/// POST /posts/{post_id}/delete_comment/{comment_id}/ - comment author only.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    let comment = state
        .comments
        .find_scoped(post_id, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("comment {comment_id}")))?;

    if !policy::owns(&comment, identity.user_id) {
        return Err(AppError::Redirect(post_url(post_id)));
    }

    state.comments.delete(comment.id).await?;

    Ok(see_other(post_url(post_id)))
}
