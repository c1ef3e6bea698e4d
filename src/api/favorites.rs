//! Favorite routes.

use actix_web::{delete, get, post, web, HttpResponse};
use uuid::Uuid;

use crate::api::courses::is_visible;
use crate::auth::AuthUser;
use crate::db::{courses, favorites, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::course::{CourseResponse, FavoriteCourseResponse, FavoriteRequest};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(add_favorite)
        .service(remove_favorite)
        .service(list_favorites);
}

/// Mark a course as favorite. Idempotent.
///
/// POST /api/v1/favorites
#[utoipa::path(
    post,
    path = "/api/v1/favorites",
    request_body = FavoriteRequest,
    responses(
        (status = 200, description = "Course favorited (or already was)"),
        (status = 404, description = "Course absent or not visible to the caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "favorites",
)]
#[post("/favorites")]
pub async fn add_favorite(
    auth: AuthUser,
    body: web::Json<FavoriteRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let course_id = body.course_id;

    let course = courses::find_by_id(pool.connection(), course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("course".into()))?;

    if !is_visible(&course, Some(&auth.0)) {
        return Err(AppError::NotFound("course".into()));
    }

    let favorite = favorites::insert(pool.connection(), auth.0.id, course_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "course_id": course_id,
        "favorited_at": favorite.created_at,
    })))
}

/// Remove a favorite.
///
/// DELETE /api/v1/favorites/{course_id}
#[utoipa::path(
    delete,
    path = "/api/v1/favorites/{course_id}",
    responses(
        (status = 204, description = "Favorite removed"),
        (status = 404, description = "Course was not favorited"),
    ),
    security(("bearer_auth" = [])),
    tag = "favorites",
)]
#[delete("/favorites/{course_id}")]
pub async fn remove_favorite(
    auth: AuthUser,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let removed = favorites::delete_pair(pool.connection(), auth.0.id, path.into_inner()).await?;
    if !removed {
        return Err(AppError::NotFound("favorite".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}

/// The caller's favorited courses, most recently favorited first.
///
/// GET /api/v1/favorites
#[utoipa::path(
    get,
    path = "/api/v1/favorites",
    responses((status = 200, description = "Favorited courses", body = [FavoriteCourseResponse])),
    security(("bearer_auth" = [])),
    tag = "favorites",
)]
#[get("/favorites")]
pub async fn list_favorites(auth: AuthUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let rows = favorites::list_by_user(pool.connection(), auth.0.id).await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        // A favorite may outlive its course only within a single
        // request window; skip rather than fail the whole listing
        let Some(course) = courses::find_by_id(pool.connection(), row.course_id).await? else {
            continue;
        };
        let card_count = courses::count_cards(pool.connection(), course.id).await?;
        out.push(FavoriteCourseResponse {
            course: CourseResponse::from_model(course, card_count),
            favorited_at: row.created_at,
        });
    }

    Ok(HttpResponse::Ok().json(out))
}
