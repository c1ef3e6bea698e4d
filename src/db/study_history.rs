//! Study history persistence. Append-only.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::study_history::{self, Entity as StudyHistoryEntity};
use crate::error::AppResult;

pub async fn insert(
    db: &DatabaseConnection,
    user_id: Uuid,
    course_id: Uuid,
) -> AppResult<study_history::Model> {
    let model = study_history::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        course_id: Set(course_id),
        studied_at: Set(Utc::now()),
    };
    Ok(model.insert(db).await?)
}

/// A user's study sessions, newest first.
pub async fn list_by_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> AppResult<Vec<study_history::Model>> {
    Ok(StudyHistoryEntity::find()
        .filter(study_history::Column::UserId.eq(user_id))
        .order_by_desc(study_history::Column::StudiedAt)
        .all(db)
        .await?)
}
