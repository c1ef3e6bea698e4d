//! HS256 JWT issuance and verification.
//!
//! Two token kinds share one signing key: short-lived access tokens
//! and longer-lived refresh tokens. The `token_type` claim keeps them
//! from being swapped for one another.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{JwtSettings, TOKEN_ISSUER};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    #[serde(rename = "access")]
    Access,
    #[serde(rename = "refresh")]
    Refresh,
}

impl TokenKind {
    fn label(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: TokenKind,
}

fn issue(settings: &JwtSettings, user_id: Uuid, kind: TokenKind) -> Result<String, AppError> {
    let ttl = match kind {
        TokenKind::Access => settings.access_token_ttl_secs,
        TokenKind::Refresh => settings.refresh_token_ttl_secs,
    };
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        sub: user_id,
        iss: TOKEN_ISSUER.to_owned(),
        iat: now,
        exp: now + ttl as i64,
        token_type: kind,
    };

    let key = EncodingKey::from_secret(settings.secret.expose_secret().as_bytes());
    encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
}

pub fn issue_access_token(settings: &JwtSettings, user_id: Uuid) -> Result<String, AppError> {
    issue(settings, user_id, TokenKind::Access)
}

pub fn issue_refresh_token(settings: &JwtSettings, user_id: Uuid) -> Result<String, AppError> {
    issue(settings, user_id, TokenKind::Refresh)
}

/// Verifies a token's signature, expiry, issuer, and kind, returning
/// its claims. Expired and malformed tokens both map to 401; the
/// distinction only shows up in the logs.
pub fn verify_token(
    settings: &JwtSettings,
    token: &str,
    expected: TokenKind,
) -> Result<TokenClaims, AppError> {
    let key = DecodingKey::from_secret(settings.secret.expose_secret().as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);

    let data = decode::<TokenClaims>(token, &key, &validation).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                tracing::debug!("rejected expired {} token", expected.label());
            }
            kind => {
                tracing::debug!("rejected invalid token: {:?}", kind);
            }
        }
        AppError::Unauthorized("invalid or expired token".into())
    })?;

    if data.claims.token_type != expected {
        return Err(AppError::Unauthorized(format!(
            "expected an {} token",
            expected.label()
        )));
    }

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn settings() -> JwtSettings {
        JwtSettings::new(
            SecretString::from("unit-test-secret-at-least-32-bytes!!"),
            3600,
            604800,
        )
    }

    #[test]
    fn access_token_round_trip() {
        let s = settings();
        let user_id = Uuid::new_v4();
        let token = issue_access_token(&s, user_id).unwrap();
        let claims = verify_token(&s, &token, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.token_type, TokenKind::Access);
        assert!(claims.exp - claims.iat == 3600);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let s = settings();
        let token = issue_refresh_token(&s, Uuid::new_v4()).unwrap();
        assert!(verify_token(&s, &token, TokenKind::Access).is_err());
        assert!(verify_token(&s, &token, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let s = settings();
        let token = issue_access_token(&s, Uuid::new_v4()).unwrap();

        let other = JwtSettings::new(
            SecretString::from("a-completely-different-signing-key!!"),
            3600,
            604800,
        );
        assert!(verify_token(&other, &token, TokenKind::Access).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let s = settings();
        assert!(verify_token(&s, "not.a.jwt", TokenKind::Access).is_err());
        assert!(verify_token(&s, "", TokenKind::Access).is_err());
    }
}
