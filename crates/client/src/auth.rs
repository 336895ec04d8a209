//! Process-wide authentication context.
//!
//! One [`AuthContext`] is created at start-up and handed (as
//! `Arc<AuthContext>`) to every component that talks to the backend. Login
//! initializes it, logout tears it down, and a 401 from any call clears it
//! and publishes [`AuthState::SignedOut`] with a redirect to the login
//! screen. Nothing reads credentials from ambient storage.

use quill_core::types::{EntityId, Timestamp};
use quill_core::user::User;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};

/// Entry point of the login screen.
pub const LOGIN_PATH: &str = "/login";

/// Credentials returned by a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Bearer token attached to every authenticated call.
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedIn {
        user_id: Option<EntityId>,
        since: Timestamp,
    },
    SignedOut {
        /// Where the UI should navigate, when the sign-out was forced.
        redirect_to: Option<String>,
    },
}

impl AuthState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn { .. })
    }
}

/// Shared credential holder; thread-safe via interior `RwLock`.
pub struct AuthContext {
    credentials: RwLock<Option<Credentials>>,
    state: watch::Sender<AuthState>,
}

impl AuthContext {
    /// A signed-out context.
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::SignedOut { redirect_to: None });
        Self {
            credentials: RwLock::new(None),
            state,
        }
    }

    /// Initialize the session (login).
    pub async fn sign_in(&self, credentials: Credentials) {
        let user_id = credentials.user.as_ref().map(|u| u.id.clone());
        *self.credentials.write().await = Some(credentials);
        tracing::info!(user_id = ?user_id, "Signed in");
        self.state.send_replace(AuthState::SignedIn {
            user_id,
            since: chrono::Utc::now(),
        });
    }

    /// Tear the session down (logout).
    pub async fn sign_out(&self) {
        self.credentials.write().await.take();
        tracing::info!("Signed out");
        self.state
            .send_replace(AuthState::SignedOut { redirect_to: None });
    }

    /// Policy for a 401: clear credentials and ask the UI to go to the
    /// login screen.
    pub async fn handle_unauthorized(&self) {
        let had_session = self.credentials.write().await.take().is_some();
        tracing::warn!(had_session, "Credential rejected by backend, signing out");
        self.state.send_replace(AuthState::SignedOut {
            redirect_to: Some(LOGIN_PATH.to_string()),
        });
    }

    /// Current bearer token, if signed in.
    pub async fn bearer(&self) -> Option<String> {
        self.credentials
            .read()
            .await
            .as_ref()
            .map(|c| c.access_token.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.credentials
            .read()
            .await
            .as_ref()
            .and_then(|c| c.user.clone())
    }

    /// Snapshot of the session state.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Subscribe to session changes (login, logout, forced sign-out).
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(token: &str) -> Credentials {
        Credentials {
            access_token: token.to_string(),
            refresh_token: None,
            user: None,
        }
    }

    #[tokio::test]
    async fn sign_in_then_out() {
        let auth = AuthContext::new();
        assert!(!auth.is_authenticated().await);

        auth.sign_in(creds("abc")).await;
        assert_eq!(auth.bearer().await.as_deref(), Some("abc"));
        assert!(auth.state().is_signed_in());

        auth.sign_out().await;
        assert!(auth.bearer().await.is_none());
        assert_eq!(auth.state(), AuthState::SignedOut { redirect_to: None });
    }

    #[tokio::test]
    async fn unauthorized_clears_and_requests_redirect() {
        let auth = AuthContext::new();
        let mut rx = auth.subscribe();
        auth.sign_in(creds("abc")).await;
        let _ = rx.borrow_and_update();

        auth.handle_unauthorized().await;

        rx.changed().await.expect("state should change");
        assert_eq!(
            *rx.borrow(),
            AuthState::SignedOut {
                redirect_to: Some(LOGIN_PATH.to_string())
            }
        );
        assert!(auth.bearer().await.is_none());
    }
}
