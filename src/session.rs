use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{self, ApiClient};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Founder,
    Investor,
}

/// Client-local authentication state. Populated at sign-in, cleared at
/// sign-out or landing entry; single UI flow, no concurrent writers.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub authenticated: bool,
    pub username: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
struct SigninResponse {
    #[serde(default)]
    #[allow(dead_code)]
    message: String,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct AuthStatus {
    authenticated: bool,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    role: Option<Role>,
}

/// Injectable session context with an explicit init/teardown lifecycle,
/// replacing ambient per-page lookups of auth state.
pub struct SessionContext {
    inner: Mutex<Session>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Session::default()),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().authenticated
    }

    pub fn role(&self) -> Option<Role> {
        self.lock().role
    }

    /// Wholesale teardown, used by sign-out and landing-page entry.
    pub fn clear(&self) {
        *self.lock() = Session::default();
    }

    #[tracing::instrument(skip(self, api, password))]
    pub async fn sign_in(
        &self,
        api: &ApiClient,
        username: &str,
        password: &str,
    ) -> Result<Session, AppError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::MissingField("username and password".to_string()));
        }
        let body = json!({ "username": username, "password": password });
        let response: SigninResponse = api::decode(api.post("signin/", &body).await?)?;

        let session = Session {
            authenticated: true,
            username: Some(username.to_string()),
            role: Some(response.role),
        };
        *self.lock() = session.clone();
        tracing::info!(username, role = ?response.role, "signed in");
        Ok(session)
    }

    #[tracing::instrument(skip(self, api, password, confirm))]
    pub async fn sign_up(
        &self,
        api: &ApiClient,
        username: &str,
        password: &str,
        confirm: &str,
        role: Role,
    ) -> Result<(), AppError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::MissingField("username and password".to_string()));
        }
        if password != confirm {
            return Err(AppError::MissingField("matching passwords".to_string()));
        }
        let body = json!({
            "username": username,
            "password1": password,
            "password2": confirm,
            "role": role,
        });
        api.post("signup/", &body).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, api))]
    pub async fn sign_out(&self, api: &ApiClient) -> Result<(), AppError> {
        api.post("signout/", &json!({})).await?;
        self.clear();
        Ok(())
    }

    /// Re-hydrates the session from the backend's auth-check endpoint.
    #[tracing::instrument(skip(self, api))]
    pub async fn restore(&self, api: &ApiClient) -> Result<Session, AppError> {
        let status: AuthStatus = api::decode(api.get("check-auth/").await?)?;
        let session = if status.authenticated {
            Session {
                authenticated: true,
                username: status.username,
                role: status.role,
            }
        } else {
            Session::default()
        };
        *self.lock() = session.clone();
        Ok(session)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Session> {
        self.inner.lock().expect("session state poisoned")
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// What to do with a navigation attempt against a protected surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    RedirectSignIn,
    RedirectLanding,
}

/// Pure role-guard decision, re-evaluated on every navigation. An empty
/// allow-list means any authenticated user may pass.
pub fn route(session: &Session, allowed: &[Role]) -> RouteDecision {
    if !session.authenticated {
        return RouteDecision::RedirectSignIn;
    }
    match session.role {
        Some(role) if allowed.is_empty() || allowed.contains(&role) => RouteDecision::Render,
        _ => RouteDecision::RedirectLanding,
    }
}
