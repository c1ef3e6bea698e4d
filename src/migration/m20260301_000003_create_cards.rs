//! Migration: Create cards table.
//!
//! Handlers delete a course's cards explicitly inside the course-delete
//! transaction; the ON DELETE CASCADE foreign key is the backstop.

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
                CREATE TABLE cards (
                    id UUID PRIMARY KEY,
                    course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
                    front TEXT NOT NULL,
                    back TEXT NOT NULL,
                    position INTEGER NOT NULL DEFAULT 0,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Index for fetching a course's cards in order
                CREATE INDEX idx_cards_course_position
                    ON cards(course_id, position);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS cards CASCADE;")
            .await?;

        Ok(())
    }
}
