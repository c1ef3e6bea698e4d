//! Card DTOs and card-back validation.
//!
//! A card back is either plain text or a JSON object describing a
//! structured question. Two structured types are supported:
//!
//! - `{"type": "multiple_choice", "options": [...], "correctAnswer": ...}`
//!   with at least two options and the correct answer among them
//! - `{"type": "fill_in_blank", "correctAnswer": ...}`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CardResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub front: String,
    pub back: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::card::Model> for CardResponse {
    fn from(m: crate::entity::card::Model) -> Self {
        Self {
            id: m.id,
            course_id: m.course_id,
            front: m.front,
            back: m.back,
            position: m.position,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCardRequest {
    pub front: String,
    pub back: String,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCardRequest {
    pub front: Option<String>,
    pub back: Option<String>,
    pub position: Option<i32>,
}

/// Validates a card back, returning 400 on malformed structured content.
///
/// Anything that does not parse as a JSON object is accepted as plain
/// text. Objects must carry a known `type` and its required fields.
pub fn validate_card_back(back: &str) -> Result<(), AppError> {
    let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(back) else {
        return Ok(());
    };

    let Some(kind) = obj.get("type").and_then(Value::as_str) else {
        return Err(AppError::InvalidInput(
            "structured card back must have a 'type' field".into(),
        ));
    };

    match kind {
        "multiple_choice" => {
            let Some(options) = obj.get("options").and_then(Value::as_array) else {
                return Err(AppError::InvalidInput(
                    "multiple_choice card must have an 'options' array".into(),
                ));
            };
            if options.len() < 2 {
                return Err(AppError::InvalidInput(
                    "multiple_choice card needs at least two options".into(),
                ));
            }
            let Some(answer) = obj.get("correctAnswer") else {
                return Err(AppError::InvalidInput(
                    "multiple_choice card must have a 'correctAnswer'".into(),
                ));
            };
            if !options.contains(answer) {
                return Err(AppError::InvalidInput(
                    "correctAnswer must be one of the options".into(),
                ));
            }
            Ok(())
        }
        "fill_in_blank" => {
            if obj.get("correctAnswer").is_none() {
                return Err(AppError::InvalidInput(
                    "fill_in_blank card must have a 'correctAnswer'".into(),
                ));
            }
            Ok(())
        }
        other => Err(AppError::InvalidInput(format!(
            "unknown card type '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_back_is_valid() {
        assert!(validate_card_back("the mitochondria").is_ok());
        assert!(validate_card_back("").is_ok());
        // JSON but not an object: still plain text
        assert!(validate_card_back("[1, 2, 3]").is_ok());
        assert!(validate_card_back("42").is_ok());
    }

    #[test]
    fn multiple_choice_requires_answer_among_options() {
        let good = r#"{"type":"multiple_choice","options":["a","b"],"correctAnswer":"a"}"#;
        assert!(validate_card_back(good).is_ok());

        let stray = r#"{"type":"multiple_choice","options":["a","b"],"correctAnswer":"c"}"#;
        assert!(validate_card_back(stray).is_err());
    }

    #[test]
    fn multiple_choice_requires_two_options() {
        let single = r#"{"type":"multiple_choice","options":["a"],"correctAnswer":"a"}"#;
        assert!(validate_card_back(single).is_err());

        let missing = r#"{"type":"multiple_choice","correctAnswer":"a"}"#;
        assert!(validate_card_back(missing).is_err());
    }

    #[test]
    fn fill_in_blank_requires_answer() {
        assert!(validate_card_back(r#"{"type":"fill_in_blank","correctAnswer":"x"}"#).is_ok());
        assert!(validate_card_back(r#"{"type":"fill_in_blank"}"#).is_err());
    }

    #[test]
    fn object_without_type_is_rejected() {
        assert!(validate_card_back(r#"{"options":["a","b"]}"#).is_err());
        assert!(validate_card_back(r#"{"type":"essay"}"#).is_err());
    }
}
