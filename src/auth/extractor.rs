//! Request extractors for authenticated and admin-only routes.
//!
//! Handlers take an [`AuthUser`] (or [`AdminUser`]) parameter; the
//! extractor verifies the bearer token, loads the account, and rejects
//! banned users before the handler body runs. Routes with mixed
//! visibility take `Option<AuthUser>` and treat extraction failure as
//! an anonymous caller.

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::auth::tokens::{verify_token, TokenKind};
use crate::config::Config;
use crate::db::{users, DbPool};
use crate::error::AppError;
use crate::models::user::User;

/// Any authenticated, non-banned account.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// An authenticated account with the ADMIN role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
    let header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing Authorization header".into()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::to_owned)
        .ok_or_else(|| AppError::Unauthorized("expected a bearer token".into()))
}

async fn authenticate(req: HttpRequest) -> Result<User, AppError> {
    let token = bearer_token(&req)?;

    let config = req
        .app_data::<web::Data<Config>>()
        .ok_or_else(|| AppError::Internal("configuration not registered".into()))?;
    let pool = req
        .app_data::<web::Data<DbPool>>()
        .ok_or_else(|| AppError::Internal("database pool not registered".into()))?;

    let claims = verify_token(&config.jwt, &token, TokenKind::Access)?;

    let user = users::find_by_id(pool.connection(), claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".into()))?;

    if user.is_banned() {
        return Err(AppError::Forbidden("account is banned".into()));
    }

    Ok(user)
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { authenticate(req).await.map(AuthUser) })
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let user = authenticate(req).await?;
            if !user.is_admin() {
                return Err(AppError::Forbidden("admin role required".into()));
            }
            Ok(AdminUser(user))
        })
    }
}
