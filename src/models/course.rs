//! Course DTOs, favorites, and study history views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::card::{CardResponse, CreateCardRequest};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_path: Option<String>,
    pub owner_id: Uuid,
    pub public: bool,
    pub is_published: bool,
    pub card_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CourseResponse {
    pub fn from_model(m: crate::entity::course::Model, card_count: u64) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            image_path: m.image_path,
            owner_id: m.owner_id,
            public: m.public,
            is_published: m.is_published,
            card_count,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Course with its full card list, for the detail and quiz views.
#[derive(Debug, Serialize, ToSchema)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub cards: Vec<CardResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub public: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub public: Option<bool>,
}

/// Publish payload: the full replacement card set.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishRequest {
    pub cards: Vec<CreateCardRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FavoriteRequest {
    pub course_id: Uuid,
}

/// A favorited course as returned by the favorites listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteCourseResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub favorited_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordStudyRequest {
    pub course_id: Uuid,
}

/// One study session in a user's history, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_name: Option<String>,
    pub studied_at: DateTime<Utc>,
}
