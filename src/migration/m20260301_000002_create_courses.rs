//! Migration: Create courses table.
//!
//! Deleting a user cascades to their courses.

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
                CREATE TABLE courses (
                    id UUID PRIMARY KEY,
                    name VARCHAR(200) NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    image_path VARCHAR(500),
                    owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    public BOOLEAN NOT NULL DEFAULT FALSE,
                    is_published BOOLEAN NOT NULL DEFAULT FALSE,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Index for listing a user's own courses, newest first
                CREATE INDEX idx_courses_owner_created_at
                    ON courses(owner_id, created_at DESC);

                -- Partial index for the public listing
                CREATE INDEX idx_courses_published_created_at
                    ON courses(created_at DESC)
                    WHERE is_published;

                -- Trigger to update updated_at
                CREATE TRIGGER update_courses_updated_at
                    BEFORE UPDATE ON courses
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_courses_updated_at ON courses;
                DROP TABLE IF EXISTS courses CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
