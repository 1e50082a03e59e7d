//! Session module
//!
//! Client-side authentication state: who is signed in, with which token,
//! and where the front end should go next.
//!
//! ## Structure
//! - `state.rs` - `SessionState`, `SessionStatus` and `Route` value types
//! - `backend.rs` - `SessionBackend` trait and its `ApiClient` implementation
//! - `manager.rs` - `SessionManager`, the state machine itself

pub mod backend;
pub mod manager;
pub mod state;


pub use backend::SessionBackend;
pub use manager::SessionManager;
pub use state::{Route, SessionState, SessionStatus};
