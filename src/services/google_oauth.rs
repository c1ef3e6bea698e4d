//! Google OAuth routes.
//!
//! Endpoints:
//! 1. GET /auth/google — Redirect to Google's consent page (with CSRF `state`)
//! 2. GET /auth/google/callback — Verify state, exchange code, issue token pair
//!
//! The callback finds or creates the account by email and returns the
//! same JSON token pair as a local login, plus `is_new_account`.
//! Provider failures surface as 502, not 401: the caller did nothing
//! wrong when Google is unreachable.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{get, web, HttpRequest, HttpResponse};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::auth::tokens::{issue_access_token, issue_refresh_token};
use crate::config::Config;
use crate::db::{users, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::user::{GoogleUserInfo, TokenResponse, UserResponse};

/// OAuth CSRF state cookie — stores the random `state` parameter
/// sent to Google, verified on callback to prevent login CSRF.
const OAUTH_STATE_COOKIE: &str = "tys_oauth_state";
/// HTTP connect timeout for Google API calls.
const HTTP_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
/// HTTP total timeout for Google API calls.
const HTTP_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Configure OAuth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(google_login).service(google_callback);
}

fn build_http_client() -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))
}

/// Generate a cryptographically random string.
fn generate_random_hex() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}

fn state_cookie(value: String, is_production: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(OAUTH_STATE_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(is_production);
    cookie
}

// ============================================================================
// Endpoints
// ============================================================================

/// Redirect to Google's OAuth consent page.
///
/// GET /api/v1/auth/google
#[get("/auth/google")]
pub async fn google_login(config: web::Data<Config>) -> AppResult<HttpResponse> {
    let oauth = &config.google_oauth;
    if !oauth.enabled {
        return Err(AppError::InvalidInput(
            "Google OAuth is not configured".to_string(),
        ));
    }

    let client_id = oauth.client_id.as_ref().ok_or_else(|| {
        AppError::InvalidInput("Google OAuth client ID not configured".to_string())
    })?;

    let redirect_uri = oauth
        .redirect_url
        .as_deref()
        .unwrap_or("/api/v1/auth/google/callback");

    let state = generate_random_hex();

    let authorize_url = format!(
        "{}?client_id={}&redirect_uri={}&state={}&response_type=code&scope={}",
        GOOGLE_AUTH_URL,
        client_id,
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&state),
        urlencoding::encode("openid email profile"),
    );

    Ok(HttpResponse::Found()
        .cookie(state_cookie(state, config.environment.is_production()))
        .append_header(("Location", authorize_url))
        .finish())
}

/// Handle Google OAuth callback.
///
/// GET /api/v1/auth/google/callback?code=...&state=...
#[get("/auth/google/callback")]
pub async fn google_callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    config: web::Data<Config>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let oauth = &config.google_oauth;
    if !oauth.enabled {
        return Err(AppError::InvalidInput(
            "Google OAuth is not configured".to_string(),
        ));
    }

    // --- CSRF state verification ---
    let expected_state = req
        .cookie(OAUTH_STATE_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| {
            warn!("OAuth callback: missing state cookie");
            AppError::Unauthorized("OAuth state verification failed".to_string())
        })?;

    let provided_state = query.state.as_deref().unwrap_or("");
    if provided_state.is_empty() || provided_state != expected_state {
        warn!("OAuth callback: state mismatch");
        return Err(AppError::Unauthorized(
            "OAuth state verification failed".to_string(),
        ));
    }

    let client_id = oauth.client_id.as_ref().ok_or_else(|| {
        AppError::InvalidInput("Google OAuth client ID not configured".to_string())
    })?;
    let client_secret = oauth.client_secret.as_ref().ok_or_else(|| {
        AppError::InvalidInput("Google OAuth client secret not configured".to_string())
    })?;
    let redirect_uri = oauth
        .redirect_url
        .as_deref()
        .unwrap_or("/api/v1/auth/google/callback");

    // --- Exchange code for access token ---
    let http_client = build_http_client()?;
    let token_response: ProviderTokenResponse = http_client
        .post(GOOGLE_TOKEN_URL)
        .form(&[
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.expose_secret()),
            ("code", query.code.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to exchange code: {}", e);
            AppError::Upstream("Google token exchange failed".to_string())
        })?
        .json()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to parse token response: {}", e);
            AppError::Upstream("Google token exchange failed".to_string())
        })?;

    if let Some(ref err) = token_response.error {
        warn!("OAuth: Google returned error: {}", err);
        return Err(AppError::Upstream(
            "Google token exchange failed".to_string(),
        ));
    }

    let google_access_token: SecretString = token_response
        .access_token
        .map(SecretString::from)
        .ok_or_else(|| {
            warn!("OAuth: no access_token in response");
            AppError::Upstream("Google token exchange failed".to_string())
        })?;

    // --- Fetch user profile ---
    let user_info: GoogleUserInfo = http_client
        .get(GOOGLE_USERINFO_URL)
        .header(
            "Authorization",
            format!("Bearer {}", google_access_token.expose_secret()),
        )
        .send()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to fetch user info: {}", e);
            AppError::Upstream("Google userinfo request failed".to_string())
        })?
        .json()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to parse user info: {}", e);
            AppError::Upstream("Google userinfo request failed".to_string())
        })?;

    if user_info.email.is_empty() {
        warn!("OAuth: Google profile has no email");
        return Err(AppError::Upstream(
            "Google profile did not include an email".to_string(),
        ));
    }

    // --- Find or create the account by email ---
    let (user, is_new_account) = users::upsert_from_google(
        pool.connection(),
        &user_info.email,
        user_info.name.as_deref(),
        user_info.picture.as_deref(),
    )
    .await?;

    if user.is_banned() {
        warn!("OAuth login rejected: banned account {}", user.id);
        return Err(AppError::Forbidden("account is banned".to_string()));
    }

    info!(
        "Google OAuth login: email='{}' (id={}, new={})",
        user_info.email, user.id, is_new_account
    );

    // --- Issue token pair ---
    let access_token = issue_access_token(&config.jwt, user.id)?;
    let refresh_token = issue_refresh_token(&config.jwt, user.id)?;

    // Clear state cookie; the tokens travel in the JSON body
    let mut clear_state = state_cookie(String::new(), config.environment.is_production());
    clear_state.make_removal();

    Ok(HttpResponse::Ok().cookie(clear_state).json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_owned(),
        expires_in: config.jwt.access_token_ttl_secs,
        user: UserResponse::from(&user),
        is_new_account: Some(is_new_account),
    }))
}

// ============================================================================
// Types
// ============================================================================

#[derive(serde::Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProviderTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}
