//! Static informational pages.

use actix_web::HttpResponse;

use blogicum_shared::dto::StaticPageResponse;

/// GET /about/
pub async fn about() -> HttpResponse {
    HttpResponse::Ok().json(StaticPageResponse {
        title: "About the project".to_string(),
        body: "Blogicum is a community blog: write posts, file them under \
               categories and places, and schedule publications for later."
            .to_string(),
    })
}

/// GET /rules/
pub async fn rules() -> HttpResponse {
    HttpResponse::Ok().json(StaticPageResponse {
        title: "Our rules".to_string(),
        body: "Be kind. Stay on topic. Authors own their words and may edit \
               or remove them at any time."
            .to_string(),
    })
}
