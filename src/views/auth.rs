use std::sync::Arc;

use crate::api::ApiClient;
use crate::notify::Notifier;
use crate::session::{Role, SessionContext};

/// Sign-in / sign-up / sign-out bindings.
pub struct AuthView {
    api: Arc<ApiClient>,
    session: Arc<SessionContext>,
    notifier: Arc<Notifier>,
}

impl AuthView {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionContext>, notifier: Arc<Notifier>) -> Self {
        Self {
            api,
            session,
            notifier,
        }
    }

    /// Landing-page entry clears any lingering session wholesale.
    pub fn enter_landing(&self) {
        self.session.clear();
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> bool {
        match self.session.sign_in(&self.api, username, password).await {
            Ok(session) => {
                let role = session
                    .role
                    .map(|r| format!("{r:?}"))
                    .unwrap_or_else(|| "user".to_string());
                self.notifier
                    .success("Signed in", &format!("Welcome back, {username} ({role})"));
                true
            }
            Err(err) => {
                self.notifier.error("Sign in failed", &err.to_string());
                false
            }
        }
    }

    pub async fn sign_up(&self, username: &str, password: &str, confirm: &str, role: Role) -> bool {
        match self
            .session
            .sign_up(&self.api, username, password, confirm, role)
            .await
        {
            Ok(()) => {
                self.notifier
                    .success("Account created", "You can sign in now");
                true
            }
            Err(err) => {
                self.notifier.error("Sign up failed", &err.to_string());
                false
            }
        }
    }

    pub async fn sign_out(&self) {
        match self.session.sign_out(&self.api).await {
            Ok(()) => {
                self.notifier.success("Signed out", "See you next time");
            }
            Err(err) => {
                // Local teardown happens regardless; the server just was not told.
                self.session.clear();
                self.notifier.error("Sign out failed", &err.to_string());
            }
        }
    }
}
