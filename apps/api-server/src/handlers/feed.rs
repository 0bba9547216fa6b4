//! Home feed handler.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use crate::handlers::{PageQuery, render};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET / - the chronological feed of publicly visible posts.
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.posts.home_feed(Utc::now(), query.page).await?;

    let authors = render::usernames(&state, page.items.iter().map(|p| p.post.author_id)).await?;

    Ok(HttpResponse::Ok().json(render::feed_page(page, &authors)))
}
