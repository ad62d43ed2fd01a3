use std::sync::Mutex;
use std::time::Duration;

use backoff::future::retry_notify;
use backoff::Error as BackoffError;
use backoff::ExponentialBackoff;
use reqwest::{multipart::Form, Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::error::AppError;

/// Cookie the backend rotates its CSRF token through.
const CSRF_COOKIE: &str = "csrftoken";
/// Header the backend expects the token echoed back on.
const CSRF_HEADER: &str = "X-CSRFToken";

/// Authenticated HTTP adapter for the marketplace backend.
///
/// Session cookies are handled by the cookie store; the CSRF token is
/// harvested from `csrftoken` on every response and attached to mutating
/// verbs. Background reads retry transient failures with exponential backoff;
/// mutations never retry, since none of the user actions are idempotent.
pub struct ApiClient {
    http: Client,
    base: Url,
    csrf: Mutex<Option<String>>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base: config.api_base.clone(),
            csrf: Mutex::new(None),
        })
    }

    /// Token currently cached from the backend, if any.
    pub fn csrf_token(&self) -> Option<String> {
        self.csrf.lock().ok().and_then(|slot| slot.clone())
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Value, AppError> {
        let url = self.endpoint(path)?;
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(10)),
            ..ExponentialBackoff::default()
        };

        let response = retry_notify(
            backoff,
            || async {
                match self.http.get(url.clone()).send().await {
                    Ok(resp) => {
                        let status = resp.status();
                        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
                            || status.is_server_error()
                        {
                            tracing::debug!("Retrying on status: {}", status);
                            Err(BackoffError::transient(anyhow::anyhow!(
                                "server returned retryable status: {}",
                                status
                            )))
                        } else {
                            // Success and plain client errors both pass
                            // through to response shaping below.
                            Ok(resp)
                        }
                    }
                    Err(err) => {
                        if err.is_timeout() || err.is_connect() || err.is_request() {
                            tracing::debug!("Retrying on reqwest error: {}", err);
                            Err(BackoffError::transient(anyhow::Error::new(err)))
                        } else {
                            Err(BackoffError::permanent(anyhow::Error::new(err)))
                        }
                    }
                }
            },
            retry_notify_handler,
        )
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;

        self.remember_csrf(&response);
        shape(response).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, AppError> {
        self.send_mutation(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, AppError> {
        self.send_mutation(Method::PUT, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, AppError> {
        self.send_mutation(Method::PATCH, path, Some(body)).await
    }

    /// DELETE, optionally with a JSON body (the unsave endpoint takes one).
    pub async fn delete(&self, path: &str, body: Option<&Value>) -> Result<Value, AppError> {
        self.send_mutation(Method::DELETE, path, body).await
    }

    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<Value, AppError> {
        self.send_multipart(Method::POST, path, form).await
    }

    pub async fn put_multipart(&self, path: &str, form: Form) -> Result<Value, AppError> {
        self.send_multipart(Method::PUT, path, form).await
    }

    #[tracing::instrument(skip(self, body))]
    async fn send_mutation(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, AppError> {
        let url = self.endpoint(path)?;
        let mut request = self.http.request(method, url);
        if let Some(token) = self.csrf_token() {
            request = request.header(CSRF_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        self.remember_csrf(&response);
        shape(response).await
    }

    #[tracing::instrument(skip(self, form))]
    async fn send_multipart(
        &self,
        method: Method,
        path: &str,
        form: Form,
    ) -> Result<Value, AppError> {
        let url = self.endpoint(path)?;
        let mut request = self.http.request(method, url).multipart(form);
        if let Some(token) = self.csrf_token() {
            request = request.header(CSRF_HEADER, token);
        }
        let response = request.send().await?;
        self.remember_csrf(&response);
        shape(response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| AppError::Network(format!("invalid endpoint {path:?}: {e}")))
    }

    fn remember_csrf(&self, response: &Response) {
        for cookie in response.cookies() {
            if cookie.name() == CSRF_COOKIE {
                if let Ok(mut slot) = self.csrf.lock() {
                    *slot = Some(cookie.value().to_string());
                }
            }
        }
    }
}

/// Decodes a shaped response body into a typed value.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, AppError> {
    serde_json::from_value(value).map_err(AppError::from)
}

async fn shape(response: Response) -> Result<Value, AppError> {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    if status.is_success() {
        Ok(body)
    } else {
        Err(AppError::Network(extract_detail(status.as_u16(), &body)))
    }
}

/// Best-effort human-readable detail from an error response body, preferring
/// a string `error`/`detail` field, then the serialized body, then a generic
/// fallback. Backend validation payloads vary in shape, so the client never
/// relies on any one of them.
pub fn extract_detail(status: u16, body: &Value) -> String {
    match body {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        Value::Object(map) => map
            .get("error")
            .or_else(|| map.get("detail"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Value::Null => format!("Server error (HTTP {status})"),
        other => other.to_string(),
    }
}

fn retry_notify_handler<E>(err: E, duration: Duration)
where
    E: std::fmt::Display,
{
    tracing::warn!(
        "Request failed: {}. Retrying in {:.1}s...",
        err,
        duration.as_secs_f32()
    );
}
