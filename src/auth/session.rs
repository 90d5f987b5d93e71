use crate::api::Backend;
use crate::types::{MessageResponse, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The signed-in user as far as the client knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub email: String,
    pub user_id: Option<String>,
}

/// Snapshot of the authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub is_guest: bool,
    pub is_admin: bool,
    /// True until the startup status check has finished.
    pub is_loading: bool,
    pub user: Option<SessionUser>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            is_guest: false,
            is_admin: false,
            is_loading: true,
            user: None,
        }
    }
}

impl SessionState {
    fn sign_out(&mut self) {
        self.is_authenticated = false;
        self.is_guest = false;
        self.is_admin = false;
        self.user = None;
    }
}

/// Owner of the session state. Mutated only through its methods.
///
/// Locks are never held across an `.await`.
pub struct SessionStore {
    backend: Arc<dyn Backend>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated
    }

    /// Restore the session from the backend cookie. Run once on startup.
    ///
    /// Any failure (server down, bad body) counts as not authenticated.
    pub async fn check_status(&self) {
        let result = self.backend.status().await;

        let mut state = self.state.write();
        match result {
            Ok(status) if status.is_authenticated => {
                state.is_authenticated = true;
                state.is_admin = status.is_admin;
                if status.email.is_none() {
                    warn!("Authenticated status without an email");
                }
                state.user = Some(SessionUser {
                    email: status.email.unwrap_or_default(),
                    user_id: status.user_id,
                });
                info!(admin = state.is_admin, "Restored authenticated session");
            }
            Ok(_) => {
                state.is_authenticated = false;
                state.is_admin = false;
                state.user = None;
                debug!("No authenticated session");
            }
            Err(e) => {
                warn!(error = %e, "Failed to check auth status");
                state.is_authenticated = false;
                state.is_admin = false;
                state.user = None;
            }
        }
        state.is_loading = false;
    }

    /// Sign in and record the user.
    ///
    /// The login reply may lack the user id and admin flag, so a status
    /// refresh follows; if that refresh fails the login result stands.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser> {
        let response = self.backend.login(email, password).await?;

        let mut user = SessionUser {
            email: response.email.unwrap_or_else(|| email.to_string()),
            user_id: response.user_id,
        };
        let mut is_admin = false;

        match self.backend.status().await {
            Ok(status) if status.is_authenticated => {
                if user.user_id.is_none() {
                    user.user_id = status.user_id;
                }
                is_admin = status.is_admin;
            }
            Ok(_) => debug!("Status refresh after login reported no session"),
            Err(e) => warn!(error = %e, "Status refresh after login failed"),
        }

        let mut state = self.state.write();
        state.is_authenticated = true;
        state.is_guest = false;
        state.is_admin = is_admin;
        state.is_loading = false;
        state.user = Some(user.clone());
        info!(email = %user.email, admin = is_admin, "Signed in");

        Ok(user)
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<String> {
        let response = self.backend.register(email, password, name).await?;
        info!(%email, "Registered account");
        Ok(response
            .message
            .unwrap_or_else(|| "Registration successful".to_string()))
    }

    /// Ask for a password reset email. Session state is untouched.
    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse> {
        let response = self.backend.forgot_password(email).await?;
        debug!("Password reset requested");
        Ok(response)
    }

    /// Set a new password with the emailed token. Does not sign in.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<MessageResponse> {
        let response = self.backend.reset_password(token, new_password).await?;
        info!("Password reset");
        Ok(response)
    }

    /// Chat without an account; nothing is saved to a history.
    pub fn continue_as_guest(&self) {
        let mut state = self.state.write();
        state.is_authenticated = false;
        state.is_admin = false;
        state.user = None;
        state.is_guest = true;
        state.is_loading = false;
        debug!("Continuing as guest");
    }

    /// Sign out. Always clears local state, even if the backend call fails.
    pub async fn logout(&self) {
        let was_authenticated = self.is_authenticated();
        if was_authenticated {
            if let Err(e) = self.backend.logout().await {
                warn!(error = %e, "Logout failed");
            }
        }

        self.state.write().sign_out();
        info!("Signed out");
    }
}
