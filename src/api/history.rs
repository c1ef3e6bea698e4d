//! Study history routes. The log is append-only.

use actix_web::{get, post, web, HttpResponse};

use crate::auth::AuthUser;
use crate::db::{courses, study_history, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::course::{HistoryEntryResponse, RecordStudyRequest};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(record_study).service(list_history);
}

/// Record one study session.
///
/// POST /api/v1/history
#[utoipa::path(
    post,
    path = "/api/v1/history",
    request_body = RecordStudyRequest,
    responses(
        (status = 201, description = "Study session recorded", body = HistoryEntryResponse),
        (status = 404, description = "Course does not exist"),
    ),
    security(("bearer_auth" = [])),
    tag = "history",
)]
#[post("/history")]
pub async fn record_study(
    auth: AuthUser,
    body: web::Json<RecordStudyRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let course = courses::find_by_id(pool.connection(), body.course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("course".into()))?;

    let entry = study_history::insert(pool.connection(), auth.0.id, course.id).await?;

    Ok(HttpResponse::Created().json(HistoryEntryResponse {
        id: entry.id,
        course_id: entry.course_id,
        course_name: Some(course.name),
        studied_at: entry.studied_at,
    }))
}

/// The caller's study history, newest first, with course names.
///
/// GET /api/v1/history
#[utoipa::path(
    get,
    path = "/api/v1/history",
    responses((status = 200, description = "Study history", body = [HistoryEntryResponse])),
    security(("bearer_auth" = [])),
    tag = "history",
)]
#[get("/history")]
pub async fn list_history(auth: AuthUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let rows = study_history::list_by_user(pool.connection(), auth.0.id).await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let course_name = courses::find_by_id(pool.connection(), row.course_id)
            .await?
            .map(|c| c.name);
        out.push(HistoryEntryResponse {
            id: row.id,
            course_id: row.course_id,
            course_name,
            studied_at: row.studied_at,
        });
    }

    Ok(HttpResponse::Ok().json(out))
}
