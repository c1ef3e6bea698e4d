//! Anonymous routes: the public catalog and published quizzes.
//!
//! Registered before the `/courses/{id}` routes so `/courses/public`
//! resolves to the catalog rather than a course id.

use actix_web::{get, web, HttpResponse};
use uuid::Uuid;

use crate::db::{cards, courses, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::card::CardResponse;
use crate::models::course::{CourseDetailResponse, CourseResponse};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_public_courses)
        .service(get_public_quiz)
        .service(get_public_quiz_questions);
}

async fn load_published(pool: &DbPool, id: Uuid) -> AppResult<crate::entity::course::Model> {
    let course = courses::find_by_id(pool.connection(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("quiz".into()))?;

    if !course.is_published {
        return Err(AppError::NotFound("quiz".into()));
    }
    Ok(course)
}

/// Published courses, newest first.
///
/// GET /api/v1/courses/public
#[utoipa::path(
    get,
    path = "/api/v1/courses/public",
    responses((status = 200, description = "Published courses", body = [CourseResponse])),
    tag = "public",
)]
#[get("/courses/public")]
pub async fn list_public_courses(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let models = courses::list_published(pool.connection()).await?;

    let mut out = Vec::with_capacity(models.len());
    for model in models {
        let card_count = courses::count_cards(pool.connection(), model.id).await?;
        out.push(CourseResponse::from_model(model, card_count));
    }

    Ok(HttpResponse::Ok().json(out))
}

/// A published quiz with its cards.
///
/// GET /api/v1/public/quiz/{id}
#[utoipa::path(
    get,
    path = "/api/v1/public/quiz/{id}",
    responses(
        (status = 200, description = "Published quiz", body = CourseDetailResponse),
        (status = 404, description = "Absent or unpublished"),
    ),
    tag = "public",
)]
#[get("/public/quiz/{id}")]
pub async fn get_public_quiz(
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let course = load_published(&pool, path.into_inner()).await?;

    let card_models = cards::list_by_course(pool.connection(), course.id).await?;
    let cards: Vec<CardResponse> = card_models.into_iter().map(CardResponse::from).collect();
    let card_count = cards.len() as u64;

    Ok(HttpResponse::Ok().json(CourseDetailResponse {
        course: CourseResponse::from_model(course, card_count),
        cards,
    }))
}

/// Only the question cards of a published quiz.
///
/// GET /api/v1/public/quiz/{id}/questions
#[utoipa::path(
    get,
    path = "/api/v1/public/quiz/{id}/questions",
    responses(
        (status = 200, description = "Ordered quiz cards", body = [CardResponse]),
        (status = 404, description = "Absent or unpublished"),
    ),
    tag = "public",
)]
#[get("/public/quiz/{id}/questions")]
pub async fn get_public_quiz_questions(
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let course = load_published(&pool, path.into_inner()).await?;

    let card_models = cards::list_by_course(pool.connection(), course.id).await?;
    let cards: Vec<CardResponse> = card_models.into_iter().map(CardResponse::from).collect();

    Ok(HttpResponse::Ok().json(cards))
}
