//! Migration: Create favorites table.
//!
//! The (user_id, course_id) uniqueness constraint makes favorite
//! creation idempotent. Rows follow their course or user on delete.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE favorites (
                    id UUID PRIMARY KEY,
                    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    CONSTRAINT uq_favorites_user_course UNIQUE (user_id, course_id)
                );

                CREATE INDEX idx_favorites_user ON favorites(user_id);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS favorites CASCADE;")
            .await?;

        Ok(())
    }
}
