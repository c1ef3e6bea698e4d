//! SeaORM entity definitions for the PostgreSQL database.

pub mod card;
pub mod course;
pub mod favorite;
pub mod study_history;
pub mod user;
