//! Health check endpoints.

use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::DbPool;

/// Health check response.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

/// Readiness check response.
#[derive(Serialize, ToSchema)]
pub struct ReadyResponse {
    status: &'static str,
    database: &'static str,
}

/// Health check endpoint.
///
/// Returns 200 if the service is running.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check endpoint.
///
/// Returns 200 if the service is ready to accept requests (database connected).
#[utoipa::path(
    get,
    path = "/api/v1/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service unavailable")
    )
)]
#[get("/ready")]
pub async fn ready(pool: web::Data<DbPool>) -> HttpResponse {
    match pool.connection().ping().await {
        Ok(_) => HttpResponse::Ok().json(ReadyResponse {
            status: "ready",
            database: "connected",
        }),
        Err(_) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "error": "NOT_READY",
            "message": "Database connection failed"
        })),
    }
}

/// Configure health routes.
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(ready);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};

    #[actix_rt::test]
    async fn test_health_returns_200() {
        let app = test::init_service(App::new().service(health)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
    }
}
