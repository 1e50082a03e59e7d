//! Services module
//!
//! Typed wrappers over [`ApiClient`](crate::api::ApiClient), one per backend
//! resource.

pub mod auth;
pub mod family;
pub mod user;

pub use auth::AuthService;
pub use family::FamilyService;
pub use user::UserService;
