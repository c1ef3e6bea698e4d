//! Local authentication: register, login, token refresh, profile.

use actix_web::{get, post, web, HttpResponse};
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::tokens::{issue_access_token, issue_refresh_token, verify_token, TokenKind};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::{users, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::user::{
    LoginRequest, RefreshRequest, RegisterRequest, Role, TokenResponse, User, UserResponse,
};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(refresh)
        .service(me);
}

pub(crate) fn token_pair(config: &Config, user: &User) -> AppResult<TokenResponse> {
    Ok(TokenResponse {
        access_token: issue_access_token(&config.jwt, user.id)?,
        refresh_token: issue_refresh_token(&config.jwt, user.id)?,
        token_type: "Bearer".to_owned(),
        expires_in: config.jwt.access_token_ttl_secs,
        user: UserResponse::from(user),
        is_new_account: None,
    })
}

fn validate_credentials(username: &str, password: &str) -> AppResult<()> {
    if username.trim().is_empty() {
        return Err(AppError::InvalidInput("username must not be empty".into()));
    }
    if username.len() > 100 {
        return Err(AppError::InvalidInput(
            "username must be at most 100 characters".into(),
        ));
    }
    if password.len() < 8 {
        return Err(AppError::InvalidInput(
            "password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

/// Create a local account.
///
/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid username or password"),
        (status = 409, description = "Username already taken"),
    ),
    tag = "auth",
)]
#[post("/auth/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    validate_credentials(&body.username, &body.password)?;

    if users::find_by_username(pool.connection(), &body.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("username already taken".into()));
    }

    let password_hash = hash_password(&body.password)?;
    let user = users::insert_local(
        pool.connection(),
        &body.username,
        body.name.as_deref(),
        &password_hash,
        Role::User,
    )
    .await?;

    info!("registered user '{}' ({})", body.username, user.id);

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Authenticate with username and password.
///
/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair", body = TokenResponse),
        (status = 401, description = "Unknown username or wrong password"),
        (status = 403, description = "Account is banned"),
    ),
    tag = "auth",
)]
#[post("/auth/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    config: web::Data<Config>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    // One error for both unknown-user and wrong-password so the
    // response does not reveal which usernames exist
    let user = users::find_by_username(pool.connection(), &body.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid username or password".into()))?;

    let Some(ref stored_hash) = user.password_hash else {
        return Err(AppError::Unauthorized(
            "invalid username or password".into(),
        ));
    };

    if !verify_password(&body.password, stored_hash) {
        warn!("failed login attempt for '{}'", body.username);
        return Err(AppError::Unauthorized(
            "invalid username or password".into(),
        ));
    }

    if user.is_banned() {
        warn!("login rejected: banned account {}", user.id);
        return Err(AppError::Forbidden("account is banned".into()));
    }

    users::touch_last_login(pool.connection(), user.id).await?;

    Ok(HttpResponse::Ok().json(token_pair(&config, &user)?))
}

/// Exchange a refresh token for a new token pair.
///
/// POST /api/v1/auth/refresh
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenResponse),
        (status = 401, description = "Invalid or expired refresh token"),
        (status = 403, description = "Account is banned"),
    ),
    tag = "auth",
)]
#[post("/auth/refresh")]
pub async fn refresh(
    body: web::Json<RefreshRequest>,
    config: web::Data<Config>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let claims = verify_token(&config.jwt, &body.refresh_token, TokenKind::Refresh)?;

    let user = users::find_by_id(pool.connection(), claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".into()))?;

    if user.is_banned() {
        return Err(AppError::Forbidden("account is banned".into()));
    }

    Ok(HttpResponse::Ok().json(token_pair(&config, &user)?))
}

/// Current account's profile.
///
/// GET /api/v1/auth/me
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "auth",
)]
#[get("/auth/me")]
pub async fn me(auth: AuthUser) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserResponse::from(&auth.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::entity::user;

    fn user_row(username: &str) -> user::Model {
        let now = Utc::now();
        user::Model {
            id: Uuid::new_v4(),
            username: Some(username.to_owned()),
            email: None,
            name: None,
            avatar_url: None,
            password_hash: Some("$argon2id$stored".to_owned()),
            role: "USER".to_owned(),
            oauth_login: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_web::test]
    async fn registration_creates_the_account() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // Username lookup finds nothing, then the insert returns the row
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([vec![user_row("freshname")]])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let app =
            test::init_service(App::new().app_data(web::Data::new(pool)).service(register)).await;

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(serde_json::json!({ "username": "freshname", "password": "longenough" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn duplicate_registration_is_a_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row("taken")]])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let app =
            test::init_service(App::new().app_data(web::Data::new(pool)).service(register)).await;

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(serde_json::json!({ "username": "taken", "password": "longenough" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn short_passwords_are_rejected_before_any_lookup() {
        // No scripted results: a DB round-trip would fail the test
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let pool = DbPool::from_connection(db);

        let app =
            test::init_service(App::new().app_data(web::Data::new(pool)).service(register)).await;

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(serde_json::json!({ "username": "someone", "password": "short" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
