use std::sync::{Arc, Mutex};

use crate::lifecycle::Lifecycle;
use crate::models::{Decision, FundingRequest, RequestStatus};
use crate::notify::Notifier;
use crate::views::format_inr;

/// Founder decision surface: received requests, search, accept/reject.
pub struct FundingView {
    lifecycle: Arc<Lifecycle>,
    notifier: Arc<Notifier>,
    query: Mutex<String>,
}

impl FundingView {
    pub fn new(lifecycle: Arc<Lifecycle>, notifier: Arc<Notifier>) -> Self {
        Self {
            lifecycle,
            notifier,
            query: Mutex::new(String::new()),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn load(&self) {
        if let Err(err) = self.lifecycle.refresh_requests().await {
            tracing::error!(%err, "failed to refresh funding requests");
            self.notifier
                .error("Load failed", "Could not load funding requests");
        }
    }

    pub fn set_query(&self, query: &str) {
        *self.query.lock().expect("query poisoned") = query.trim().to_string();
    }

    /// Requests matching the current query against startup or investor name.
    pub fn filtered(&self) -> Vec<FundingRequest> {
        let query = self
            .query
            .lock()
            .expect("query poisoned")
            .to_lowercase();
        let requests = self.lifecycle.requests();
        if query.is_empty() {
            return requests;
        }
        requests
            .into_iter()
            .filter(|r| {
                r.startup.name.to_lowercase().contains(&query)
                    || r.investor
                        .as_ref()
                        .map(|i| {
                            i.full_name.to_lowercase().contains(&query)
                                || i.username.to_lowercase().contains(&query)
                        })
                        .unwrap_or(false)
            })
            .collect()
    }

    /// Accept or reject. Stale records resolve quietly; the render already
    /// shows their settled status.
    pub async fn decide(&self, request_id: i64, decision: Decision) {
        match self.lifecycle.decide(request_id, decision).await {
            Ok(Some(_)) | Ok(None) => {}
            Err(err) => {
                self.notifier.error("Update failed", &err.to_string());
            }
        }
    }

    pub fn render(&self) -> String {
        let requests = self.filtered();
        if requests.is_empty() {
            return "No funding requests.\n".to_string();
        }
        let mut out = String::new();
        for request in &requests {
            let investor = request
                .investor
                .as_ref()
                .map(|i| {
                    if i.full_name.is_empty() {
                        i.username.clone()
                    } else {
                        i.full_name.clone()
                    }
                })
                .unwrap_or_else(|| "unknown investor".to_string());
            let status = match request.status {
                RequestStatus::Pending => "PENDING — accept/reject",
                RequestStatus::Accepted => "ACCEPTED",
                RequestStatus::Rejected => "REJECTED",
            };
            out.push_str(&format!(
                "#{} {} ← {} for {} [{}]\n",
                request.id,
                request.startup.name,
                investor,
                format_inr(request.amount),
                status,
            ));
        }
        out
    }
}
