//! Service-layer routes: OAuth login and image uploads.

pub mod google_oauth;
pub mod uploads;
