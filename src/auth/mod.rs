//! Authentication: password hashing, JWT issuance, request extractors.

pub mod extractor;
pub mod password;
pub mod tokens;

pub use extractor::{AdminUser, AuthUser};
