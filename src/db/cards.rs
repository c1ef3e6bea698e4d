//! Card persistence.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::card::{self, Entity as CardEntity};
use crate::error::{AppError, AppResult};

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    course_id: Uuid,
    front: &str,
    back: &str,
    position: i32,
) -> AppResult<card::Model> {
    let model = card::ActiveModel {
        id: Set(Uuid::now_v7()),
        course_id: Set(course_id),
        front: Set(front.to_owned()),
        back: Set(back.to_owned()),
        position: Set(position),
        created_at: Set(Utc::now()),
    };
    Ok(model.insert(db).await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<card::Model>> {
    Ok(CardEntity::find_by_id(id).one(db).await?)
}

/// A course's cards in study order.
pub async fn list_by_course<C: ConnectionTrait>(
    db: &C,
    course_id: Uuid,
) -> AppResult<Vec<card::Model>> {
    Ok(CardEntity::find()
        .filter(card::Column::CourseId.eq(course_id))
        .order_by_asc(card::Column::Position)
        .order_by_asc(card::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Position for an appended card: one past the current maximum.
pub async fn next_position(db: &DatabaseConnection, course_id: Uuid) -> AppResult<i32> {
    let last = CardEntity::find()
        .filter(card::Column::CourseId.eq(course_id))
        .order_by_desc(card::Column::Position)
        .limit(1)
        .one(db)
        .await?;
    Ok(last.map_or(0, |c| c.position + 1))
}

/// Partial update. `None` fields are left unchanged.
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    front: Option<String>,
    back: Option<String>,
    position: Option<i32>,
) -> AppResult<card::Model> {
    let existing = CardEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("card".into()))?;

    let mut model: card::ActiveModel = existing.into();
    if let Some(front) = front {
        model.front = Set(front);
    }
    if let Some(back) = back {
        model.back = Set(back);
    }
    if let Some(position) = position {
        model.position = Set(position);
    }
    Ok(model.update(db).await?)
}

pub async fn delete(db: &DatabaseConnection, id: Uuid) -> AppResult<()> {
    let result = CardEntity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("card".into()));
    }
    Ok(())
}

pub async fn delete_by_course<C: ConnectionTrait>(db: &C, course_id: Uuid) -> AppResult<u64> {
    let result = CardEntity::delete_many()
        .filter(card::Column::CourseId.eq(course_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
