//! # foodlink-core
//!
//! Core client library for FoodLink - shared by every front end.
//!
//! This crate provides:
//! - Session state management (`session` module)
//! - REST client for the FoodLink backend (`api` module)
//! - Typed endpoint wrappers (`services` module)
//! - Token persistence (`storage` module)
//! - Data models (`models` module)
//! - Configuration (`config` module)
//! - Unified error handling (`error` module)

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;

// Re-exports for convenience
pub use api::ApiClient;
pub use config::{ClientConfig, RestoreValidation};
pub use error::{Error, Result};

// Re-export commonly used types from models
pub use models::{
    ActivityLevel, AuthPayload, BaseResponse, Envelope, FamilyMember, FamilyMemberRequest,
    Gender, HealthCondition, LoginRequest, RegisterRequest, Relationship, UpdateProfileRequest,
    User, UserProfile,
};

// Re-export the session API
pub use session::{Route, SessionBackend, SessionManager, SessionState, SessionStatus};

// Re-export services and storage
pub use services::{AuthService, FamilyService, UserService};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version
pub fn version() -> &'static str {
    VERSION
}
