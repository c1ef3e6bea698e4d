//! TestYourself server library.
//!
//! Flashcard/quiz API backend: accounts (local and Google OAuth),
//! courses with cards, favorites, study history, publishing, and
//! admin moderation.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
