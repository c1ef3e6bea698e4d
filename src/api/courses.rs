//! Course and card-collection routes.
//!
//! Visibility rule used throughout: the owner and admins always see a
//! course; everyone else only sees it once published or marked
//! public. Single-resource reads answer 404 for both "absent" and
//! "not visible" so the API never confirms that a hidden course
//! exists.

use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::TransactionTrait;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::{cards, courses, DbPool};
use crate::entity::course;
use crate::error::{AppError, AppResult};
use crate::models::card::{validate_card_back, CardResponse, CreateCardRequest};
use crate::models::course::{
    CourseDetailResponse, CourseResponse, CreateCourseRequest, PublishRequest, UpdateCourseRequest,
};
use crate::models::user::User;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_course)
        .service(list_courses)
        .service(get_course)
        .service(update_course)
        .service(delete_course)
        .service(list_cards)
        .service(create_card)
        .service(publish_course);
}

pub(crate) fn is_visible(course: &course::Model, viewer: Option<&User>) -> bool {
    if course.is_published || course.public {
        return true;
    }
    matches!(viewer, Some(u) if u.id == course.owner_id || u.is_admin())
}

pub(crate) fn is_owner_or_admin(course: &course::Model, user: &User) -> bool {
    course.owner_id == user.id || user.is_admin()
}

/// Loads a course the caller may mutate, answering 404 otherwise.
pub(crate) async fn load_owned_course(
    pool: &DbPool,
    course_id: Uuid,
    user: &User,
) -> AppResult<course::Model> {
    let course = courses::find_by_id(pool.connection(), course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("course".into()))?;

    if !is_owner_or_admin(&course, user) {
        return Err(AppError::NotFound("course".into()));
    }
    Ok(course)
}

/// Rejects a publish payload before anything touches the database, so
/// a bad request leaves the prior card set intact.
pub(crate) fn validate_publish_request(req: &PublishRequest) -> AppResult<()> {
    if req.cards.is_empty() {
        return Err(AppError::InvalidInput(
            "publishing requires at least one card".into(),
        ));
    }
    for card in &req.cards {
        if card.front.trim().is_empty() || card.back.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "every card needs a front and a back".into(),
            ));
        }
        validate_card_back(&card.back)?;
    }
    Ok(())
}

async fn course_detail(pool: &DbPool, course: course::Model) -> AppResult<CourseDetailResponse> {
    let card_models = cards::list_by_course(pool.connection(), course.id).await?;
    let cards: Vec<CardResponse> = card_models.into_iter().map(CardResponse::from).collect();
    let card_count = cards.len() as u64;

    Ok(CourseDetailResponse {
        course: CourseResponse::from_model(course, card_count),
        cards,
    })
}

async fn with_card_counts(
    pool: &DbPool,
    models: Vec<course::Model>,
) -> AppResult<Vec<CourseResponse>> {
    let mut out = Vec::with_capacity(models.len());
    for model in models {
        let card_count = courses::count_cards(pool.connection(), model.id).await?;
        out.push(CourseResponse::from_model(model, card_count));
    }
    Ok(out)
}

/// Create a course.
///
/// POST /api/v1/courses
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Missing name"),
    ),
    security(("bearer_auth" = [])),
    tag = "courses",
)]
#[post("/courses")]
pub async fn create_course(
    auth: AuthUser,
    body: web::Json<CreateCourseRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    if body.name.trim().is_empty() {
        return Err(AppError::InvalidInput("course name must not be empty".into()));
    }

    let course = courses::insert(
        pool.connection(),
        auth.0.id,
        body.name.trim(),
        &body.description,
        body.public,
    )
    .await?;

    info!("user {} created course {}", auth.0.id, course.id);

    Ok(HttpResponse::Created().json(CourseResponse::from_model(course, 0)))
}

/// The caller's courses, newest first.
///
/// GET /api/v1/courses
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    responses((status = 200, description = "Caller's courses", body = [CourseResponse])),
    security(("bearer_auth" = [])),
    tag = "courses",
)]
#[get("/courses")]
pub async fn list_courses(auth: AuthUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let models = courses::list_by_owner(pool.connection(), auth.0.id).await?;
    Ok(HttpResponse::Ok().json(with_card_counts(&pool, models).await?))
}

/// A single course with its ordered cards.
///
/// GET /api/v1/courses/{id}
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    responses(
        (status = 200, description = "Course detail", body = CourseDetailResponse),
        (status = 404, description = "Absent or not visible to the caller"),
    ),
    tag = "courses",
)]
#[get("/courses/{id}")]
pub async fn get_course(
    auth: Option<AuthUser>,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let course = courses::find_by_id(pool.connection(), path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("course".into()))?;

    if !is_visible(&course, auth.as_ref().map(|a| &a.0)) {
        return Err(AppError::NotFound("course".into()));
    }

    Ok(HttpResponse::Ok().json(course_detail(&pool, course).await?))
}

/// Partial course update.
///
/// PUT /api/v1/courses/{id}
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Updated course", body = CourseResponse),
        (status = 404, description = "Absent or not owned by the caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "courses",
)]
#[put("/courses/{id}")]
pub async fn update_course(
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCourseRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let course_id = path.into_inner();
    load_owned_course(&pool, course_id, &auth.0).await?;

    let body = body.into_inner();
    if let Some(ref name) = body.name
        && name.trim().is_empty()
    {
        return Err(AppError::InvalidInput("course name must not be empty".into()));
    }

    let updated = courses::update(
        pool.connection(),
        course_id,
        body.name,
        body.description,
        body.public,
    )
    .await?;
    let card_count = courses::count_cards(pool.connection(), course_id).await?;

    Ok(HttpResponse::Ok().json(CourseResponse::from_model(updated, card_count)))
}

/// Delete a course and its cards.
///
/// DELETE /api/v1/courses/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    responses(
        (status = 204, description = "Course and cards deleted"),
        (status = 404, description = "Absent or not owned by the caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "courses",
)]
#[delete("/courses/{id}")]
pub async fn delete_course(
    auth: AuthUser,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let course_id = path.into_inner();
    load_owned_course(&pool, course_id, &auth.0).await?;

    courses::delete_with_cards(pool.connection(), course_id).await?;

    info!("user {} deleted course {}", auth.0.id, course_id);

    Ok(HttpResponse::NoContent().finish())
}

/// A course's cards in study order.
///
/// GET /api/v1/courses/{id}/cards
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/cards",
    responses(
        (status = 200, description = "Ordered cards", body = [CardResponse]),
        (status = 404, description = "Absent or not visible to the caller"),
    ),
    tag = "courses",
)]
#[get("/courses/{id}/cards")]
pub async fn list_cards(
    auth: Option<AuthUser>,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let course = courses::find_by_id(pool.connection(), path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("course".into()))?;

    if !is_visible(&course, auth.as_ref().map(|a| &a.0)) {
        return Err(AppError::NotFound("course".into()));
    }

    let card_models = cards::list_by_course(pool.connection(), course.id).await?;
    let cards: Vec<CardResponse> = card_models.into_iter().map(CardResponse::from).collect();

    Ok(HttpResponse::Ok().json(cards))
}

/// Append a card to a course.
///
/// POST /api/v1/courses/{id}/cards
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/cards",
    request_body = CreateCardRequest,
    responses(
        (status = 201, description = "Card created", body = CardResponse),
        (status = 400, description = "Missing front/back or malformed structured back"),
        (status = 404, description = "Absent or not owned by the caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "courses",
)]
#[post("/courses/{id}/cards")]
pub async fn create_card(
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<CreateCardRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let course_id = path.into_inner();
    load_owned_course(&pool, course_id, &auth.0).await?;

    let body = body.into_inner();
    if body.front.trim().is_empty() {
        return Err(AppError::InvalidInput("card front must not be empty".into()));
    }
    if body.back.trim().is_empty() {
        return Err(AppError::InvalidInput("card back must not be empty".into()));
    }
    validate_card_back(&body.back)?;

    let position = match body.position {
        Some(p) => p,
        None => cards::next_position(pool.connection(), course_id).await?,
    };

    let card = cards::insert(pool.connection(), course_id, &body.front, &body.back, position)
        .await?;

    Ok(HttpResponse::Created().json(CardResponse::from(card)))
}

/// Publish a course, replacing its entire card set.
///
/// The submitted list becomes the course's cards in order; the
/// previous set is deleted in the same transaction. An empty list is
/// rejected up front, leaving the prior cards untouched.
///
/// POST /api/v1/courses/{id}/publish
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/publish",
    request_body = PublishRequest,
    responses(
        (status = 200, description = "Published course with its new cards", body = CourseDetailResponse),
        (status = 400, description = "Empty card list or malformed card"),
        (status = 404, description = "Absent or not owned by the caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "courses",
)]
#[post("/courses/{id}/publish")]
pub async fn publish_course(
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<PublishRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let course_id = path.into_inner();
    load_owned_course(&pool, course_id, &auth.0).await?;

    let body = body.into_inner();
    validate_publish_request(&body)?;

    let txn = pool.connection().begin().await?;

    cards::delete_by_course(&txn, course_id).await?;
    for (index, card) in body.cards.iter().enumerate() {
        cards::insert(&txn, course_id, &card.front, &card.back, index as i32).await?;
    }
    let published = courses::set_published(&txn, course_id, true).await?;

    txn.commit().await?;

    info!(
        "user {} published course {} with {} cards",
        auth.0.id,
        course_id,
        body.cards.len()
    );

    Ok(HttpResponse::Ok().json(course_detail(&pool, published).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::user::Role;

    fn a_user(role: Role) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: Some("someone".into()),
            email: None,
            name: None,
            avatar_url: None,
            password_hash: Some("hash".into()),
            role,
            oauth_login: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn a_course(owner_id: Uuid, public: bool, is_published: bool) -> course::Model {
        let now = Utc::now();
        course::Model {
            id: Uuid::now_v7(),
            name: "Geography".into(),
            description: String::new(),
            image_path: None,
            owner_id,
            public,
            is_published,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn private_unpublished_courses_are_hidden_from_others() {
        let owner = a_user(Role::User);
        let stranger = a_user(Role::User);
        let admin = a_user(Role::Admin);
        let course = a_course(owner.id, false, false);

        assert!(is_visible(&course, Some(&owner)));
        assert!(is_visible(&course, Some(&admin)));
        assert!(!is_visible(&course, Some(&stranger)));
        assert!(!is_visible(&course, None));
    }

    #[test]
    fn public_flag_grants_read_access_without_publishing() {
        let course = a_course(Uuid::new_v4(), true, false);
        let stranger = a_user(Role::User);

        assert!(is_visible(&course, None));
        assert!(is_visible(&course, Some(&stranger)));
    }

    #[test]
    fn published_courses_are_visible_to_everyone() {
        let course = a_course(Uuid::new_v4(), false, true);

        assert!(is_visible(&course, None));
        assert!(is_visible(&course, Some(&a_user(Role::User))));
    }

    #[test]
    fn only_the_owner_or_an_admin_may_mutate() {
        let owner = a_user(Role::User);
        let stranger = a_user(Role::User);
        let admin = a_user(Role::Admin);
        // Published courses stay read-only for everyone else
        let course = a_course(owner.id, true, true);

        assert!(is_owner_or_admin(&course, &owner));
        assert!(is_owner_or_admin(&course, &admin));
        assert!(!is_owner_or_admin(&course, &stranger));
    }

    #[test]
    fn empty_publish_payload_is_rejected_before_any_write() {
        let req = PublishRequest { cards: vec![] };
        let err = validate_publish_request(&req).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn publish_payload_cards_are_validated() {
        let good = PublishRequest {
            cards: vec![CreateCardRequest {
                front: "Capital of France?".into(),
                back: "Paris".into(),
                position: None,
            }],
        };
        assert!(validate_publish_request(&good).is_ok());

        let blank_front = PublishRequest {
            cards: vec![CreateCardRequest {
                front: "  ".into(),
                back: "Paris".into(),
                position: None,
            }],
        };
        assert!(validate_publish_request(&blank_front).is_err());

        let malformed_back = PublishRequest {
            cards: vec![CreateCardRequest {
                front: "Pick one".into(),
                back: r#"{"type":"multiple_choice","options":["a"],"correctAnswer":"a"}"#.into(),
                position: None,
            }],
        };
        assert!(validate_publish_request(&malformed_back).is_err());
    }
}
