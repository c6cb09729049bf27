use crate::database::CalendarStore;
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Storage is unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(store: web::Data<dyn CalendarStore>) -> impl Responder {
    let (status, database, mut response) = match store.ping().await {
        Ok(()) => ("healthy", "up".to_string(), HttpResponse::Ok()),
        Err(e) => {
            log::warn!("⚠️  Health check failed: {}", e);
            ("degraded", "down".to_string(), HttpResponse::ServiceUnavailable())
        }
    };

    response.json(HealthResponse {
        status: status.to_string(),
        service: "calendar-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        timestamp: chrono::Utc::now().timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use actix_web::{test, App};
    use std::sync::Arc;

    #[actix_rt::test]
    async fn test_health_reports_storage() {
        let store: Arc<dyn CalendarStore> = Arc::new(MemoryStore::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(store))
                .route("/health", web::get().to(health_check)),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.database, "up");
        assert_eq!(body.service, "calendar-service");
    }
}
