//! Admin routes. Every handler takes an [`AdminUser`] extractor.
//!
//! Admin accounts are shielded from each other: no ban, role change,
//! or deletion may target an ADMIN, and self-deletion is refused.

use actix_web::{delete, get, put, web, HttpResponse};
use tracing::info;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::db::{courses, users, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::course::CourseResponse;
use crate::models::user::{AdminUpdateUserRequest, Role, UserResponse};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(list_courses)
        .service(toggle_ban)
        .service(update_user)
        .service(delete_user)
        .service(delete_course);
}

/// All accounts.
///
/// GET /api/v1/admin/users
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses((status = 200, description = "All accounts", body = [UserResponse])),
    security(("bearer_auth" = [])),
    tag = "admin",
)]
#[get("/admin/users")]
pub async fn list_users(_admin: AdminUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let all = users::list_all(pool.connection()).await?;
    let out: Vec<UserResponse> = all.iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(out))
}

/// Every course in the system.
///
/// GET /api/v1/admin/courses
#[utoipa::path(
    get,
    path = "/api/v1/admin/courses",
    responses((status = 200, description = "All courses", body = [CourseResponse])),
    security(("bearer_auth" = [])),
    tag = "admin",
)]
#[get("/admin/courses")]
pub async fn list_courses(_admin: AdminUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let models = courses::list_all(pool.connection()).await?;

    let mut out = Vec::with_capacity(models.len());
    for model in models {
        let card_count = courses::count_cards(pool.connection(), model.id).await?;
        out.push(CourseResponse::from_model(model, card_count));
    }

    Ok(HttpResponse::Ok().json(out))
}

/// Toggle a user between BANNED and USER.
///
/// PUT /api/v1/admin/users/{id}/ban
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/ban",
    responses(
        (status = 200, description = "User with toggled role", body = UserResponse),
        (status = 403, description = "Target is an admin"),
        (status = 404, description = "No such user"),
    ),
    security(("bearer_auth" = [])),
    tag = "admin",
)]
#[put("/admin/users/{id}/ban")]
pub async fn toggle_ban(
    admin: AdminUser,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let target_id = path.into_inner();

    let target = users::find_by_id(pool.connection(), target_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".into()))?;

    if target.is_admin() {
        return Err(AppError::Forbidden("cannot ban an admin".into()));
    }

    let new_role = if target.is_banned() {
        Role::User
    } else {
        Role::Banned
    };
    let updated = users::set_role(pool.connection(), target_id, new_role).await?;

    info!(
        "admin {} set user {} role to {}",
        admin.0.id, target_id, new_role
    );

    Ok(HttpResponse::Ok().json(UserResponse::from(&updated)))
}

/// Edit a user's name or role.
///
/// PUT /api/v1/admin/users/{id}
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}",
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Role target outside USER/BANNED"),
        (status = 403, description = "Target is another admin"),
        (status = 404, description = "No such user"),
    ),
    security(("bearer_auth" = [])),
    tag = "admin",
)]
#[put("/admin/users/{id}")]
pub async fn update_user(
    admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<AdminUpdateUserRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let target_id = path.into_inner();
    let body = body.into_inner();

    let target = users::find_by_id(pool.connection(), target_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".into()))?;

    if target.is_admin() && target.id != admin.0.id {
        return Err(AppError::Forbidden("cannot modify another admin".into()));
    }

    if let Some(role) = body.role {
        if role == Role::Admin {
            return Err(AppError::InvalidInput(
                "role can only be set to USER or BANNED".into(),
            ));
        }
        if target.is_admin() {
            return Err(AppError::Forbidden("cannot change an admin's role".into()));
        }
    }

    let updated = users::admin_update(pool.connection(), target_id, body.name, body.role).await?;

    info!("admin {} updated user {}", admin.0.id, target_id);

    Ok(HttpResponse::Ok().json(UserResponse::from(&updated)))
}

/// Delete a user and everything they own.
///
/// DELETE /api/v1/admin/users/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    responses(
        (status = 204, description = "User and owned data deleted"),
        (status = 403, description = "Target is an admin or the caller"),
        (status = 404, description = "No such user"),
    ),
    security(("bearer_auth" = [])),
    tag = "admin",
)]
#[delete("/admin/users/{id}")]
pub async fn delete_user(
    admin: AdminUser,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let target_id = path.into_inner();

    if target_id == admin.0.id {
        return Err(AppError::Forbidden("cannot delete your own account".into()));
    }

    let target = users::find_by_id(pool.connection(), target_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".into()))?;

    if target.is_admin() {
        return Err(AppError::Forbidden("cannot delete an admin".into()));
    }

    users::delete(pool.connection(), target_id).await?;

    info!("admin {} deleted user {}", admin.0.id, target_id);

    Ok(HttpResponse::NoContent().finish())
}

/// Delete any course.
///
/// DELETE /api/v1/admin/courses/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/admin/courses/{id}",
    responses(
        (status = 204, description = "Course and cards deleted"),
        (status = 404, description = "No such course"),
    ),
    security(("bearer_auth" = [])),
    tag = "admin",
)]
#[delete("/admin/courses/{id}")]
pub async fn delete_course(
    admin: AdminUser,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let course_id = path.into_inner();

    courses::delete_with_cards(pool.connection(), course_id).await?;

    info!("admin {} deleted course {}", admin.0.id, course_id);

    Ok(HttpResponse::NoContent().finish())
}
