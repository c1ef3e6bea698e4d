//! Database connection pool and query modules.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

pub mod cards;
pub mod courses;
pub mod favorites;
pub mod study_history;
pub mod users;

/// Shared handle to the SeaORM connection pool.
#[derive(Clone)]
pub struct DbPool {
    connection: DatabaseConnection,
}

impl DbPool {
    /// Connects to Postgres with sane pool defaults.
    pub async fn connect(database_url: &str) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(database_url.to_owned());
        options
            .max_connections(20)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false);

        let connection = Database::connect(options).await?;
        Ok(Self { connection })
    }

    /// Wraps an existing connection. Lets tests run against a mock
    /// backend.
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}
