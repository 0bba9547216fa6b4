//! Category feed handler.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_shared::dto::CategoryFeedResponse;

use crate::handlers::{PageQuery, render};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /category/{slug}/ - visible posts filed under a published category.
///
/// An unpublished or unknown category is a 404; the route never reveals
/// that a hidden category exists.
pub async fn feed(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    let category = state
        .categories
        .find_published_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category '{slug}'")))?;

    let page = state
        .posts
        .category_feed(category.id, Utc::now(), query.page)
        .await?;

    let authors = render::usernames(&state, page.items.iter().map(|p| p.post.author_id)).await?;

    Ok(HttpResponse::Ok().json(CategoryFeedResponse {
        category: render::category_response(category),
        posts: render::feed_page(page, &authors),
    }))
}
