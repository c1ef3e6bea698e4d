//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TestYourself Server",
        version = "0.3.0",
        description = "Flashcard/quiz API: accounts (local + Google OAuth), courses with cards, favorites, study history, publishing, and admin moderation"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Auth endpoints
        api::auth::register,
        api::auth::login,
        api::auth::refresh,
        api::auth::me,
        // Course endpoints
        api::courses::create_course,
        api::courses::list_courses,
        api::courses::get_course,
        api::courses::update_course,
        api::courses::delete_course,
        api::courses::list_cards,
        api::courses::create_card,
        api::courses::publish_course,
        // Card endpoints
        api::cards::update_card,
        api::cards::delete_card,
        // Public endpoints
        api::public::list_public_courses,
        api::public::get_public_quiz,
        api::public::get_public_quiz_questions,
        // Favorites endpoints
        api::favorites::add_favorite,
        api::favorites::remove_favorite,
        api::favorites::list_favorites,
        // History endpoints
        api::history::record_study,
        api::history::list_history,
        // Admin endpoints
        api::admin::list_users,
        api::admin::list_courses,
        api::admin::toggle_ban,
        api::admin::update_user,
        api::admin::delete_user,
        api::admin::delete_course,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Users and auth
            models::Role,
            models::UserResponse,
            models::RegisterRequest,
            models::LoginRequest,
            models::RefreshRequest,
            models::TokenResponse,
            models::AdminUpdateUserRequest,
            // Courses
            models::CourseResponse,
            models::CourseDetailResponse,
            models::CreateCourseRequest,
            models::UpdateCourseRequest,
            models::PublishRequest,
            models::FavoriteRequest,
            models::FavoriteCourseResponse,
            models::RecordStudyRequest,
            models::HistoryEntryResponse,
            // Cards
            models::CardResponse,
            models::CreateCardRequest,
            models::UpdateCardRequest,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login, and tokens"),
        (name = "courses", description = "Course and card management"),
        (name = "cards", description = "Single-card operations"),
        (name = "public", description = "Anonymous catalog and quizzes"),
        (name = "favorites", description = "Favorite courses"),
        (name = "history", description = "Study history"),
        (name = "admin", description = "User and course moderation")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add bearer token security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
