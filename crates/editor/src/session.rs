//! Login screen workflow.

use std::sync::Arc;

use quill_cache::QueryCache;
use quill_client::{ApiClient, AuthState, LoginResponse};
use quill_core::validation::{not_blank, FieldErrors};
use validator::Validate;

use crate::error::EditorError;
use crate::notify::Notifier;

#[derive(Debug, Clone, Default, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

/// Signs the shared auth context in and out.
pub struct Session {
    client: ApiClient,
    cache: Arc<QueryCache>,
    notifier: Arc<Notifier>,
}

impl Session {
    pub fn new(client: ApiClient, cache: Arc<QueryCache>, notifier: Arc<Notifier>) -> Self {
        Self {
            client,
            cache,
            notifier,
        }
    }

    /// Validate the credentials locally, then log in.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, EditorError> {
        let form = LoginForm {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        if let Err(e) = form.validate() {
            return Err(EditorError::Invalid(FieldErrors::from(e)));
        }

        match self.client.login(&form.email, &form.password).await {
            Ok(login) => {
                let name = login.user.as_ref().map(|u| u.name.as_str()).unwrap_or("");
                if name.is_empty() {
                    self.notifier.success("Signed in");
                } else {
                    self.notifier.success(format!("Welcome back, {name}"));
                }
                Ok(login)
            }
            Err(e) => {
                self.notifier.error(e.user_message());
                Err(e.into())
            }
        }
    }

    /// End the session. Local state is torn down even when the backend
    /// call fails.
    pub async fn logout(&self) {
        if let Err(e) = self.client.logout().await {
            tracing::debug!(error = %e, "Backend logout failed");
        }
        self.cache.clear().await;
        self.notifier.info("Signed out");
    }

    pub fn state(&self) -> AuthState {
        self.client.auth().state()
    }
}
