//! Single-card routes. Authorization follows the parent course.

use actix_web::{delete, put, web, HttpResponse};
use uuid::Uuid;

use crate::api::courses::is_owner_or_admin;
use crate::auth::AuthUser;
use crate::db::{cards, courses, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::card::{validate_card_back, CardResponse, UpdateCardRequest};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(update_card).service(delete_card);
}

/// Loads a card whose parent course the caller may mutate; both the
/// card being absent and the course belonging to someone else answer
/// 404.
async fn load_owned_card(
    pool: &DbPool,
    card_id: Uuid,
    user: &crate::models::user::User,
) -> AppResult<crate::entity::card::Model> {
    let card = cards::find_by_id(pool.connection(), card_id)
        .await?
        .ok_or_else(|| AppError::NotFound("card".into()))?;

    let course = courses::find_by_id(pool.connection(), card.course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("card".into()))?;

    if !is_owner_or_admin(&course, user) {
        return Err(AppError::NotFound("card".into()));
    }
    Ok(card)
}

/// Partial card update.
///
/// PUT /api/v1/cards/{id}
#[utoipa::path(
    put,
    path = "/api/v1/cards/{id}",
    request_body = UpdateCardRequest,
    responses(
        (status = 200, description = "Updated card", body = CardResponse),
        (status = 400, description = "Malformed structured back"),
        (status = 404, description = "Absent or parent course not owned by the caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "cards",
)]
#[put("/cards/{id}")]
pub async fn update_card(
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCardRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let card_id = path.into_inner();
    load_owned_card(&pool, card_id, &auth.0).await?;

    let body = body.into_inner();
    if let Some(ref front) = body.front
        && front.trim().is_empty()
    {
        return Err(AppError::InvalidInput("card front must not be empty".into()));
    }
    if let Some(ref back) = body.back {
        if back.trim().is_empty() {
            return Err(AppError::InvalidInput("card back must not be empty".into()));
        }
        validate_card_back(back)?;
    }

    let updated = cards::update(
        pool.connection(),
        card_id,
        body.front,
        body.back,
        body.position,
    )
    .await?;

    Ok(HttpResponse::Ok().json(CardResponse::from(updated)))
}

/// Delete a single card.
///
/// DELETE /api/v1/cards/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/cards/{id}",
    responses(
        (status = 204, description = "Card deleted"),
        (status = 404, description = "Absent or parent course not owned by the caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "cards",
)]
#[delete("/cards/{id}")]
pub async fn delete_card(
    auth: AuthUser,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let card_id = path.into_inner();
    load_owned_card(&pool, card_id, &auth.0).await?;

    cards::delete(pool.connection(), card_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
