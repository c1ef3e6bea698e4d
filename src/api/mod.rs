//! HTTP route handlers.

pub mod admin;
pub mod auth;
pub mod cards;
pub mod courses;
pub mod favorites;
pub mod health;
pub mod history;
pub mod openapi;
pub mod public;
