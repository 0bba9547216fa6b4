//! HTTP handlers and route configuration.

mod auth;
mod category;
mod comments;
mod feed;
mod health;
mod pages;
mod posts;
mod profile;
mod render;
mod validate;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, http::header, web};
use serde::Deserialize;
use uuid::Uuid;

/// Configure all application routes.
///
/// Registration order matters under `/posts`: the literal `create/`
/// segment must precede the `{id}` matcher.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(feed::index))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/auth")
                .route("/registration/", web::post().to(auth::register))
                .route("/login/", web::post().to(auth::login))
                .route("/me/", web::get().to(auth::me)),
        )
        .service(
            web::scope("/posts")
                .route("/create/", web::post().to(posts::create))
                .route("/{id}/", web::get().to(posts::detail))
                .route("/{id}/edit/", web::get().to(posts::edit_form))
                .route("/{id}/edit/", web::post().to(posts::edit))
                .route("/{id}/delete/", web::post().to(posts::delete))
                .route("/{post_id}/comment/", web::post().to(comments::create))
                .route(
                    "/{post_id}/comment/{comment_id}/edit/",
                    web::post().to(comments::edit),
                )
                .route(
                    "/{post_id}/delete_comment/{comment_id}/",
                    web::post().to(comments::delete),
                ),
        )
        .route("/category/{slug}/", web::get().to(category::feed))
        .route("/profile/{username}/", web::get().to(profile::detail))
        .route(
            "/profile/{username}/edit/",
            web::get().to(profile::edit_form),
        )
        .route("/profile/{username}/edit/", web::post().to(profile::edit))
        .route("/about/", web::get().to(pages::about))
        .route("/rules/", web::get().to(pages::rules));
}

/// `?page=N` query for paginated feeds, defaulting to the first page.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: u64,
}

fn first_page() -> u64 {
    1
}

/// 303 redirect used as the follow-up to successful mutations.
pub(crate) fn see_other(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.as_ref().to_owned()))
        .finish()
}

pub(crate) fn post_url(id: Uuid) -> String {
    format!("/posts/{id}/")
}

pub(crate) fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}
