//! Profile handlers: author feed and profile editing.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_shared::dto::{ProfileFeedResponse, ProfileForm};

use crate::handlers::{PageQuery, profile_url, render, see_other, validate};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /profile/{username}/ - the author's posts.
///
/// The author browsing their own profile sees every post they wrote,
/// unpublished and scheduled ones included; everyone else sees only what
/// the visibility rule allows.
pub async fn detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();

    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile '{username}'")))?;

    let include_hidden = viewer.user_id() == Some(user.id);

    let page = state
        .posts
        .author_feed(user.id, include_hidden, Utc::now(), query.page)
        .await?;

    let mut authors = std::collections::HashMap::new();
    authors.insert(user.id, user.username.clone());

    Ok(HttpResponse::Ok().json(ProfileFeedResponse {
        profile: render::profile_response(&user),
        posts: render::feed_page(page, &authors),
    }))
}

fn guard_username(identity: &Identity, username: &str) -> AppResult<()> {
    if identity.username != username {
        // Editing someone else's profile soft-fails back to that profile.
        return Err(AppError::Redirect(profile_url(username)));
    }
    Ok(())
}

/// GET /profile/{username}/edit/ - current values for the edit form.
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    guard_username(&identity, &username)?;

    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile '{username}'")))?;

    Ok(HttpResponse::Ok().json(render::account_response(&user)))
}

/// POST /profile/{username}/edit/ - update the viewer's own profile.
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<ProfileForm>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    guard_username(&identity, &username)?;

    let form = body.into_inner();

    let mut errors = validate::FieldErrors::new();
    if let Some(first_name) = &form.first_name {
        validate::max_len(&mut errors, "first_name", first_name, 150);
    }
    if let Some(last_name) = &form.last_name {
        validate::max_len(&mut errors, "last_name", last_name, 150);
    }
    if let Some(email) = &form.email {
        validate::email_shape(&mut errors, "email", email);
    }
    errors.into_result()?;

    let mut user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile '{username}'")))?;

    user.first_name = form.first_name;
    user.last_name = form.last_name;
    user.email = form.email;

    let saved = state.users.update(user).await?;

    Ok(see_other(profile_url(&saved.username)))
}
