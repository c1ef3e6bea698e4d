//! Course persistence.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::card::{self, Entity as CardEntity};
use crate::entity::course::{self, Entity as CourseEntity};
use crate::error::{AppError, AppResult};

pub async fn insert(
    db: &DatabaseConnection,
    owner_id: Uuid,
    name: &str,
    description: &str,
    public: bool,
) -> AppResult<course::Model> {
    let now = Utc::now();
    let model = course::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name.to_owned()),
        description: Set(description.to_owned()),
        image_path: Set(None),
        owner_id: Set(owner_id),
        public: Set(public),
        is_published: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(model.insert(db).await?)
}

pub async fn find_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> AppResult<Option<course::Model>> {
    Ok(CourseEntity::find_by_id(id).one(db).await?)
}

/// A user's own courses, newest first.
pub async fn list_by_owner(
    db: &DatabaseConnection,
    owner_id: Uuid,
) -> AppResult<Vec<course::Model>> {
    Ok(CourseEntity::find()
        .filter(course::Column::OwnerId.eq(owner_id))
        .order_by_desc(course::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Published courses for the public catalog, newest first.
pub async fn list_published(db: &DatabaseConnection) -> AppResult<Vec<course::Model>> {
    Ok(CourseEntity::find()
        .filter(course::Column::IsPublished.eq(true))
        .order_by_desc(course::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Every course in the system, newest first. Admin listing.
pub async fn list_all(db: &DatabaseConnection) -> AppResult<Vec<course::Model>> {
    Ok(CourseEntity::find()
        .order_by_desc(course::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn count_cards<C: ConnectionTrait>(db: &C, course_id: Uuid) -> AppResult<u64> {
    Ok(CardEntity::find()
        .filter(card::Column::CourseId.eq(course_id))
        .count(db)
        .await?)
}

/// Partial update. `None` fields are left unchanged.
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    name: Option<String>,
    description: Option<String>,
    public: Option<bool>,
) -> AppResult<course::Model> {
    let existing = CourseEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("course".into()))?;

    let mut model: course::ActiveModel = existing.into();
    if let Some(name) = name {
        model.name = Set(name);
    }
    if let Some(description) = description {
        model.description = Set(description);
    }
    if let Some(public) = public {
        model.public = Set(public);
    }
    Ok(model.update(db).await?)
}

pub async fn set_image_path(
    db: &DatabaseConnection,
    id: Uuid,
    image_path: &str,
) -> AppResult<course::Model> {
    let existing = CourseEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("course".into()))?;

    let mut model: course::ActiveModel = existing.into();
    model.image_path = Set(Some(image_path.to_owned()));
    Ok(model.update(db).await?)
}

pub async fn set_published<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    published: bool,
) -> AppResult<course::Model> {
    let existing = CourseEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("course".into()))?;

    let mut model: course::ActiveModel = existing.into();
    model.is_published = Set(published);
    Ok(model.update(db).await?)
}

/// Deletes a course and its cards in one transaction. Favorites and
/// history rows follow via the foreign keys.
pub async fn delete_with_cards(db: &DatabaseConnection, id: Uuid) -> AppResult<()> {
    let txn = db.begin().await?;

    CardEntity::delete_many()
        .filter(card::Column::CourseId.eq(id))
        .exec(&txn)
        .await?;

    let result = CourseEntity::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        txn.rollback().await?;
        return Err(AppError::NotFound("course".into()));
    }

    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn course_delete_removes_cards_before_the_course() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        delete_with_cards(&db, Uuid::now_v7()).await.unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        let cards_at = log.find(r#"\"cards\""#).unwrap();
        let courses_at = log.find(r#"\"courses\""#).unwrap();
        assert!(cards_at < courses_at);
    }

    #[tokio::test]
    async fn deleting_a_missing_course_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let err = delete_with_cards(&db, Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
