//! Domain models and request/response DTOs.

pub mod card;
pub mod course;
pub mod user;

pub use card::*;
pub use course::*;
pub use user::*;
