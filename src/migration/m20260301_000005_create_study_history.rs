//! Migration: Create study_history table.
//!
//! Append-only log; the API never updates or deletes rows. Rows follow
//! their course or user on delete.

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
                CREATE TABLE study_history (
                    id UUID PRIMARY KEY,
                    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
                    studied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Index for a user's history, newest first
                CREATE INDEX idx_study_history_user_studied_at
                    ON study_history(user_id, studied_at DESC);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS study_history CASCADE;")
            .await?;

        Ok(())
    }
}
