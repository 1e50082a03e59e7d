//! Session state value types

use std::fmt;

use serde::Serialize;

use crate::models::User;

/// Coarse session status derived from `is_loading` / `is_authenticated`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Initial restoration from the token store has not finished yet
    Restoring,
    Unauthenticated,
    Authenticated,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Restoring => write!(f, "restoring"),
            SessionStatus::Unauthenticated => write!(f, "unauthenticated"),
            SessionStatus::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Where the front end should go after a session operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Authenticated area
    Home,
    /// Login entry point, e.g. after registering
    Login,
    /// Unauthenticated landing page, after logout
    Welcome,
}

/// Snapshot of the process-wide authentication state.
///
/// Only the constructors below can build one, so `is_authenticated` always
/// equals `token.is_some()` and `is_loading` is only set while restoring.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    user: Option<User>,
    #[serde(skip_serializing)]
    token: Option<String>,
    is_loading: bool,
    is_authenticated: bool,
}

impl SessionState {
    pub fn restoring() -> Self {
        Self {
            user: None,
            token: None,
            is_loading: true,
            is_authenticated: false,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            user: None,
            token: None,
            is_loading: false,
            is_authenticated: false,
        }
    }

    pub fn authenticated(token: impl Into<String>, user: Option<User>) -> Self {
        Self {
            user,
            token: Some(token.into()),
            is_loading: false,
            is_authenticated: true,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn status(&self) -> SessionStatus {
        if self.is_loading {
            SessionStatus::Restoring
        } else if self.is_authenticated {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Unauthenticated
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::restoring()
    }
}

// Keep the bearer token out of debug output
impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "****"))
            .field("is_loading", &self.is_loading)
            .field("is_authenticated", &self.is_authenticated)
            .finish()
    }
}
