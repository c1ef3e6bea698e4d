//! Favorite persistence.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use uuid::Uuid;

use crate::entity::favorite::{self, Entity as FavoriteEntity};
use crate::error::{AppError, AppResult};

/// Marks a course as favorite. Idempotent: if the pair already exists
/// the existing row is returned untouched, including when a concurrent
/// request wins the race and the unique index fires.
pub async fn insert(
    db: &DatabaseConnection,
    user_id: Uuid,
    course_id: Uuid,
) -> AppResult<favorite::Model> {
    if let Some(existing) = find_pair(db, user_id, course_id).await? {
        return Ok(existing);
    }

    let model = favorite::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        course_id: Set(course_id),
        created_at: Set(Utc::now()),
    };

    match model.insert(db).await {
        Ok(row) => Ok(row),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            find_pair(db, user_id, course_id)
                .await?
                .ok_or_else(|| AppError::Database(e.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn find_pair(
    db: &DatabaseConnection,
    user_id: Uuid,
    course_id: Uuid,
) -> AppResult<Option<favorite::Model>> {
    Ok(FavoriteEntity::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .filter(favorite::Column::CourseId.eq(course_id))
        .one(db)
        .await?)
}

/// Removes a favorite pair. Returns whether a row was deleted.
pub async fn delete_pair(
    db: &DatabaseConnection,
    user_id: Uuid,
    course_id: Uuid,
) -> AppResult<bool> {
    let result = FavoriteEntity::delete_many()
        .filter(favorite::Column::UserId.eq(user_id))
        .filter(favorite::Column::CourseId.eq(course_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// A user's favorites, most recently favorited first.
pub async fn list_by_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> AppResult<Vec<favorite::Model>> {
    Ok(FavoriteEntity::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .order_by_desc(favorite::Column::CreatedAt)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn double_favorite_returns_the_existing_row() {
        let user_id = Uuid::new_v4();
        let course_id = Uuid::now_v7();
        let existing = favorite::Model {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            created_at: Utc::now(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .into_connection();

        let row = insert(&db, user_id, course_id).await.unwrap();
        assert_eq!(row.id, existing.id);

        // Only the lookup ran; no second row was inserted
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
    }
}
