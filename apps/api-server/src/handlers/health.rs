//! Liveness endpoint.

use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub checked_at: DateTime<Utc>,
}

/// GET /health - answers as long as the process is up; database issues
/// surface on the real endpoints, not here.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        service: "blogicum-api",
        version: env!("CARGO_PKG_VERSION"),
        checked_at: Utc::now(),
    })
}
