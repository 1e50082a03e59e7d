//! Session state manager
//!
//! Owns the single [`SessionState`] of the application and keeps three
//! places in agreement about the bearer token: the in-memory state, the
//! [`TokenStore`] and the [`SessionBackend`].
//!
//! ```text
//!              restore()
//!   Restoring ───────────┬──────────────▶ Unauthenticated ◀─┐
//!                        │                  │    ▲   │      │ register()
//!                        │          login() │    │   └──────┘
//!                        ▼                  ▼    │ logout()
//!                  Authenticated ◀──────────┘    │
//!                        └───────────────────────┘
//! ```
//!
//! Within one operation the order is fixed: network call, persist token,
//! install token, publish state, emit route. Nothing after the network call
//! happens if it fails.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, watch, Mutex, RwLock};

use super::backend::SessionBackend;
use super::state::{Route, SessionState};
use crate::config::RestoreValidation;
use crate::error::{Error, Result};
use crate::models::{LoginRequest, RegisterRequest, UpdateProfileRequest, User, UserProfile};
use crate::storage::TokenStore;

const ROUTE_CHANNEL_CAPACITY: usize = 16;

pub struct SessionManager<B: SessionBackend, S: TokenStore> {
    backend: Arc<B>,
    store: Arc<S>,
    restore_mode: RestoreValidation,
    state: watch::Sender<SessionState>,
    profile: RwLock<Option<UserProfile>>,
    routes: broadcast::Sender<Route>,
    /// Held for the duration of restore/login/register/logout
    gate: Mutex<()>,
    restored: AtomicBool,
    /// Bumped whenever the signed-in identity changes; profile writes tagged
    /// with an older value are dropped
    epoch: AtomicU64,
}

impl<B: SessionBackend, S: TokenStore> SessionManager<B, S> {
    /// Create a manager in the `Restoring` state. Call [`restore`](Self::restore)
    /// once before use, or use [`start`](Self::start).
    pub fn new(backend: Arc<B>, store: Arc<S>, restore_mode: RestoreValidation) -> Self {
        let (state, _) = watch::channel(SessionState::restoring());
        let (routes, _) = broadcast::channel(ROUTE_CHANNEL_CAPACITY);

        Self {
            backend,
            store,
            restore_mode,
            state,
            profile: RwLock::new(None),
            routes,
            gate: Mutex::new(()),
            restored: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
        }
    }

    /// Create a manager and wait for restoration to finish
    pub async fn start(backend: Arc<B>, store: Arc<S>, restore_mode: RestoreValidation) -> Self {
        let manager = Self::new(backend, store, restore_mode);
        manager.restore().await;
        manager
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current state snapshot
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published state
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Receiver for navigation signals emitted after successful operations
    pub fn navigation(&self) -> broadcast::Receiver<Route> {
        self.routes.subscribe()
    }

    /// Last profile fetched by this manager
    pub async fn profile(&self) -> Option<UserProfile> {
        self.profile.read().await.clone()
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn restore_mode(&self) -> RestoreValidation {
        self.restore_mode
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Resume a previous session from the token store.
    ///
    /// Runs once; later calls return the current state. Never fails: any
    /// problem degrades to `Unauthenticated`, except a validation failure
    /// that is not an auth error, which keeps the stored token.
    pub async fn restore(&self) -> SessionState {
        if self.restored.swap(true, Ordering::SeqCst) {
            return self.state();
        }

        let _guard = self.gate.lock().await;

        let next = match self.store.get_token().await {
            Ok(Some(token)) => self.resume(token).await,
            Ok(None) => {
                log::info!("[session] No stored token, starting signed out");
                self.clear_credentials().await;
                SessionState::unauthenticated()
            }
            Err(e) => {
                log::warn!("[session] Failed to read stored token: {}", e);
                self.clear_credentials().await;
                SessionState::unauthenticated()
            }
        };

        self.publish(next)
    }

    async fn resume(&self, token: String) -> SessionState {
        self.backend.set_token(Some(token.clone()));

        let validated: Result<Option<User>> = match self.restore_mode {
            RestoreValidation::None => Ok(None),
            RestoreValidation::Me => self.backend.current_user().await.map(Some),
            RestoreValidation::Profile => match self.backend.profile().await {
                Ok(profile) => {
                    let user = User::from(&profile);
                    *self.profile.write().await = Some(profile);
                    Ok(Some(user))
                }
                Err(e) => Err(e),
            },
        };

        match validated {
            Ok(user) => {
                log::info!("[session] Restored stored session (validation: {})", self.restore_mode);
                SessionState::authenticated(token, user)
            }
            Err(e) if e.is_auth_error() => {
                log::warn!("[session] Stored token rejected, signing out: {}", e);
                self.clear_credentials().await;
                SessionState::unauthenticated()
            }
            Err(e) => {
                log::warn!("[session] Could not validate stored token, keeping it: {}", e);
                SessionState::authenticated(token, None)
            }
        }
    }

    /// Sign in with email and password.
    ///
    /// Errors from the backend are returned unchanged and leave the state
    /// untouched. Rejected with [`Error::OperationInProgress`] while another
    /// session operation is running.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionState> {
        let _guard = self
            .gate
            .try_lock()
            .map_err(|_| Error::OperationInProgress("login"))?;

        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let payload = self.backend.login(&credentials).await?;

        let token = payload
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::invalid_response("Login response did not include an access token"))?;
        let user = payload.identity();

        if let Err(e) = self.store.set_token(&token).await {
            log::warn!("[session] Failed to persist token, session will not survive restart: {}", e);
        }
        self.backend.set_token(Some(token.clone()));
        self.reset_profile().await;

        let state = self.publish(SessionState::authenticated(token, Some(user)));
        self.navigate(Route::Home);
        Ok(state)
    }

    /// Create an account. Does not sign in; on success the front end is sent
    /// to the login entry point.
    pub async fn register(&self, full_name: &str, email: &str, password: &str) -> Result<()> {
        let _guard = self
            .gate
            .try_lock()
            .map_err(|_| Error::OperationInProgress("register"))?;

        let data = RegisterRequest {
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.backend.register(&data).await?;

        log::info!("[session] Account registered, awaiting login");
        self.navigate(Route::Login);
        Ok(())
    }

    /// Sign out. The server is notified best-effort; local teardown always
    /// happens. Waits for an in-flight operation instead of rejecting.
    pub async fn logout(&self) -> SessionState {
        let _guard = self.gate.lock().await;

        let token = self.state.borrow().token().map(str::to_string);
        if let Some(token) = token {
            if let Err(e) = self.backend.logout(&token).await {
                log::warn!("[session] Logout request failed (token may be expired): {}", e);
            }
        }

        self.clear_credentials().await;

        let state = self.publish(SessionState::unauthenticated());
        self.navigate(Route::Welcome);
        state
    }

    /// Re-fetch the profile. Failures are logged and the cached value (if
    /// any) is returned. A result that arrives after the session changed is
    /// discarded.
    pub async fn refresh_profile(&self) -> Option<UserProfile> {
        let signed_in = self.state.borrow().is_authenticated();
        if !signed_in {
            log::debug!("[session] Skipping profile refresh while signed out");
            return None;
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        match self.backend.profile().await {
            Ok(profile) => {
                self.cache_profile(epoch, profile).await;
                self.profile().await
            }
            Err(e) => {
                log::warn!("[session] Profile refresh failed: {}", e);
                self.profile().await
            }
        }
    }

    /// Save profile changes and update the cache
    pub async fn update_profile(&self, data: &UpdateProfileRequest) -> Result<UserProfile> {
        let signed_in = self.state.borrow().is_authenticated();
        if !signed_in {
            return Err(Error::NotAuthenticated);
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        let profile = self.backend.update_profile(data).await?;
        self.cache_profile(epoch, profile.clone()).await;
        Ok(profile)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Drop the token everywhere it lives, plus the cached profile
    async fn clear_credentials(&self) {
        self.backend.set_token(None);
        if let Err(e) = self.store.remove_token().await {
            log::warn!("[session] Failed to remove stored token: {}", e);
        }
        self.reset_profile().await;
    }

    /// Start a new epoch and empty the profile cache
    async fn reset_profile(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *self.profile.write().await = None;
    }

    /// Store a profile fetched during `epoch`, unless the session moved on.
    /// The epoch is compared under the write lock so a concurrent reset
    /// either happens first (write dropped) or clears this write after.
    async fn cache_profile(&self, epoch: u64, profile: UserProfile) {
        let mut cached = self.profile.write().await;
        if self.epoch.load(Ordering::SeqCst) == epoch {
            *cached = Some(profile);
        } else {
            log::debug!("[session] Discarding profile fetched for a previous session");
        }
    }

    fn publish(&self, next: SessionState) -> SessionState {
        let previous = self.state.send_replace(next.clone());
        if previous.status() != next.status() {
            log::info!("[session] {} -> {}", previous.status(), next.status());
        }
        next
    }

    fn navigate(&self, route: Route) {
        log::debug!("[session] Navigate to {:?}", route);
        // No receivers is fine: nobody is listening for routes
        let _ = self.routes.send(route);
    }
}
