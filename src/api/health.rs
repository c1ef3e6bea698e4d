//! Health and readiness probes.

use actix_web::{get, web, HttpResponse};
use sea_orm::{ConnectionTrait, Statement};

use crate::db::DbPool;
use crate::error::AppResult;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(ready);
}

/// Liveness probe. Always 200 while the process is up.
///
/// GET /api/v1/health
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe. 200 only when the database answers.
///
/// GET /api/v1/ready
#[get("/ready")]
pub async fn ready(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    pool.connection()
        .execute_raw(Statement::from_string(
            pool.connection().get_database_backend(),
            "SELECT 1".to_owned(),
        ))
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ready" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn health_reports_ok_and_version() {
        let app = test::init_service(App::new().service(health)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
