//! Token and validation surface tests that need no database.

use secrecy::SecretString;
use uuid::Uuid;

use testyourself_lib::auth::password::{hash_password, verify_password};
use testyourself_lib::auth::tokens::{
    issue_access_token, issue_refresh_token, verify_token, TokenKind,
};
use testyourself_lib::config::{JwtSettings, TOKEN_ISSUER};
use testyourself_lib::models::card::validate_card_back;

fn jwt_settings() -> JwtSettings {
    JwtSettings::new(
        SecretString::from("integration-test-secret-32-bytes-min"),
        3600,
        604_800,
    )
}

#[test]
fn issued_access_token_carries_the_user_and_issuer() {
    let settings = jwt_settings();
    let user_id = Uuid::new_v4();

    let token = issue_access_token(&settings, user_id).unwrap();
    let claims = verify_token(&settings, &token, TokenKind::Access).unwrap();

    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.iss, TOKEN_ISSUER);
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[test]
fn token_kinds_are_not_interchangeable() {
    let settings = jwt_settings();
    let user_id = Uuid::new_v4();

    let access = issue_access_token(&settings, user_id).unwrap();
    let refresh = issue_refresh_token(&settings, user_id).unwrap();

    assert!(verify_token(&settings, &access, TokenKind::Refresh).is_err());
    assert!(verify_token(&settings, &refresh, TokenKind::Access).is_err());
}

#[test]
fn refresh_token_outlives_access_token() {
    let settings = jwt_settings();
    let user_id = Uuid::new_v4();

    let refresh = issue_refresh_token(&settings, user_id).unwrap();
    let claims = verify_token(&settings, &refresh, TokenKind::Refresh).unwrap();

    assert_eq!(claims.exp - claims.iat, 604_800);
}

#[test]
fn tokens_from_another_deployment_are_rejected() {
    let settings = jwt_settings();
    let foreign = JwtSettings::new(
        SecretString::from("some-other-deployments-signing-key!!"),
        3600,
        604_800,
    );

    let token = issue_access_token(&foreign, Uuid::new_v4()).unwrap();
    assert!(verify_token(&settings, &token, TokenKind::Access).is_err());
}

#[test]
fn tampered_tokens_are_rejected() {
    let settings = jwt_settings();
    let token = issue_access_token(&settings, Uuid::new_v4()).unwrap();

    let mut tampered = token.clone();
    tampered.pop();
    assert!(verify_token(&settings, &tampered, TokenKind::Access).is_err());
    assert!(verify_token(&settings, "garbage", TokenKind::Access).is_err());
}

#[test]
fn password_hashing_round_trip() {
    let hash = hash_password("correct horse battery staple").unwrap();
    assert!(verify_password("correct horse battery staple", &hash));
    assert!(!verify_password("incorrect horse", &hash));
    // Salted: same input, different hash
    assert_ne!(hash, hash_password("correct horse battery staple").unwrap());
}

#[test]
fn card_back_validation_full_surface() {
    // Plain text passes
    assert!(validate_card_back("Paris").is_ok());

    // Well-formed structured backs pass
    let mc = r#"{"type":"multiple_choice","options":["Paris","Lyon","Nice"],"correctAnswer":"Paris"}"#;
    assert!(validate_card_back(mc).is_ok());
    let fib = r#"{"type":"fill_in_blank","correctAnswer":"Paris"}"#;
    assert!(validate_card_back(fib).is_ok());

    // Malformed structured backs fail
    let answer_missing = r#"{"type":"multiple_choice","options":["Paris","Lyon"]}"#;
    assert!(validate_card_back(answer_missing).is_err());
    let answer_stray = r#"{"type":"multiple_choice","options":["Paris","Lyon"],"correctAnswer":"Rome"}"#;
    assert!(validate_card_back(answer_stray).is_err());
    let unknown_type = r#"{"type":"essay","correctAnswer":"anything"}"#;
    assert!(validate_card_back(unknown_type).is_err());
}
