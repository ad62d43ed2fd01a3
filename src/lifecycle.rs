use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::json;
use tracing::warn;

use crate::api::{self, ApiClient};
use crate::error::AppError;
use crate::models::{Decision, FundingRequest, RequestStatus, SavedStartup, Startup};

/// Funding progress derived from server-reported figures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub remaining: f64,
    pub fully_funded: bool,
}

/// `remaining` floors at zero even when the backend has over-raised.
pub fn compute_progress(startup: &Startup) -> Progress {
    let raised = startup.raised();
    Progress {
        remaining: (startup.funding_goal - raised).max(0.0),
        fully_funded: raised >= startup.funding_goal,
    }
}

/// Proportional share of the offered equity for a given amount. Undefined
/// when the goal or the offered equity is missing or non-positive.
pub fn compute_equity(startup: &Startup, amount: f64) -> Option<f64> {
    let equity = startup.equity.unwrap_or(0.0);
    if startup.funding_goal <= 0.0 || equity <= 0.0 || !amount.is_finite() || amount <= 0.0 {
        return None;
    }
    Some(amount / startup.funding_goal * equity)
}

/// Parses a raw amount string the way the amount inputs normalize it:
/// everything but digits and the decimal point is stripped first.
pub fn parse_amount(raw: &str) -> Result<f64, AppError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| AppError::InvalidAmount(raw.to_string()))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::InvalidAmount(raw.to_string()));
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Removed,
}

#[derive(Debug, Default)]
struct LocalState {
    startups: HashMap<i64, Startup>,
    /// Server listing order for the browse surface.
    order: Vec<i64>,
    requests: HashMap<i64, FundingRequest>,
    request_order: Vec<i64>,
    saved: HashSet<i64>,
    amount_inputs: HashMap<i64, String>,
}

/// Client-visible truth for funding requests and the startups they reference.
///
/// All local collections live behind one mutex that is only ever taken in
/// synchronous sections, never across an await. Two in-flight operations on
/// distinct keyed records may therefore resolve in either order without
/// trampling each other; the optimistic save path is the only place local
/// state moves ahead of the server, and it rolls back synchronously on
/// failure.
pub struct Lifecycle {
    api: Arc<ApiClient>,
    state: Mutex<LocalState>,
}

impl Lifecycle {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: Mutex::new(LocalState::default()),
        }
    }

    // ---- reads -----------------------------------------------------------

    #[tracing::instrument(skip(self))]
    pub async fn refresh_startups(&self) -> Result<Vec<Startup>, AppError> {
        let listed: Vec<Startup> = api::decode(self.api.get("investors/browse/").await?)?;
        let mut state = self.state();
        state.order = listed.iter().map(|s| s.id).collect();
        state.startups = listed.iter().cloned().map(|s| (s.id, s)).collect();
        Ok(listed)
    }

    #[tracing::instrument(skip(self))]
    pub async fn refresh_saved(&self) -> Result<HashSet<i64>, AppError> {
        let entries: Vec<SavedStartup> = api::decode(self.api.get("investors/saved/").await?)?;
        let ids: HashSet<i64> = entries.iter().filter_map(SavedStartup::target_id).collect();

        let mut state = self.state();
        // Full payloads ride along on the saved listing; keep the cache warm.
        for entry in entries {
            if let Some(startup) = entry.into_startup() {
                state.startups.insert(startup.id, startup);
            }
        }
        state.saved = ids.clone();
        Ok(ids)
    }

    /// Founder's received requests.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_requests(&self) -> Result<Vec<FundingRequest>, AppError> {
        let listed: Vec<FundingRequest> =
            api::decode(self.api.get("investors/founder/requests/").await?)?;
        let mut state = self.state();
        state.request_order = listed.iter().map(|r| r.id).collect();
        state.requests = listed.iter().cloned().map(|r| (r.id, r)).collect();
        Ok(listed)
    }

    /// Accepted requests for the signed-in investor.
    #[tracing::instrument(skip(self))]
    pub async fn my_investments(&self) -> Result<Vec<FundingRequest>, AppError> {
        api::decode(self.api.get("investors/my-investments/").await?)
    }

    /// Initial investor load: browse listing and saved set together.
    pub async fn bootstrap_investor(&self) -> Result<(), AppError> {
        let (startups, saved) =
            futures::future::join(self.refresh_startups(), self.refresh_saved()).await;
        startups?;
        saved?;
        Ok(())
    }

    // ---- operations ------------------------------------------------------

    /// Submits a funding request after fail-fast local validation. Two calls
    /// with the same arguments create two distinct requests; resubmission
    /// after a rejection is a new request, not a retry.
    #[tracing::instrument(skip(self))]
    pub async fn submit_request(
        &self,
        startup_id: i64,
        raw_amount: &str,
    ) -> Result<FundingRequest, AppError> {
        let amount = parse_amount(raw_amount)?;
        {
            let state = self.state();
            let startup = state
                .startups
                .get(&startup_id)
                .ok_or(AppError::UnknownStartup(startup_id))?;
            let progress = compute_progress(startup);
            if progress.fully_funded {
                return Err(AppError::FullyFunded(startup.name.clone()));
            }
            if startup.funding_goal > 0.0 && amount > progress.remaining {
                return Err(AppError::AmountTooLarge {
                    remaining: progress.remaining,
                });
            }
        }

        let body = json!({ "startup_id": startup_id, "amount": amount });
        let created: FundingRequest =
            api::decode(self.api.post("investors/requests/", &body).await?)?;

        {
            let mut state = self.state();
            state.amount_inputs.remove(&startup_id);
            if !state.request_order.contains(&created.id) {
                state.request_order.push(created.id);
            }
            state.requests.insert(created.id, created.clone());
        }

        // Raised amounts move server-side; re-read rather than guess, and
        // stay quiet if the refresh fails (not a user-awaited action).
        if let Err(err) = self.refresh_startups().await {
            warn!(%err, "post-submit startup refresh failed");
        }
        Ok(created)
    }

    /// Applies a founder decision to a pending request. Terminal and unknown
    /// records are stale no-ops (`Ok(None)`), never a second side effect. On
    /// accept, the startup cache is re-read so `amount_raised` comes from the
    /// server; the client never increments it locally.
    #[tracing::instrument(skip(self))]
    pub async fn decide(
        &self,
        request_id: i64,
        decision: Decision,
    ) -> Result<Option<FundingRequest>, AppError> {
        {
            let state = self.state();
            match state.requests.get(&request_id) {
                None => {
                    warn!(request_id, "decision ignored: request no longer cached");
                    return Ok(None);
                }
                Some(req) if req.status.is_terminal() => {
                    warn!(request_id, status = %req.status, "decision ignored: request already settled");
                    return Ok(None);
                }
                Some(_) => {}
            }
        }

        let path = format!("investors/founder/requests/{request_id}/");
        let body = json!({ "status": decision });
        // On failure the local record simply stays pending.
        let value = self.api.patch(&path, &body).await?;
        let echoed: Option<FundingRequest> = api::decode(value).ok();

        let settled = {
            let mut state = self.state();
            let Some(record) = state.requests.get_mut(&request_id) else {
                warn!(request_id, "request vanished while deciding");
                return Ok(None);
            };
            match echoed {
                Some(server) => *record = server,
                None => record.status = decision.status(),
            }
            record.clone()
        };

        if decision == Decision::Accepted {
            if let Err(err) = self.refresh_owned_startups().await {
                warn!(%err, "post-accept startup refresh failed");
            }
        }
        Ok(Some(settled))
    }

    /// Save/unsave toggle, the one optimistic operation: the local set moves
    /// first and is rolled back synchronously before the error surfaces.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_save(&self, startup_id: i64) -> Result<SaveOutcome, AppError> {
        let was_saved = self.state().saved.contains(&startup_id);
        let body = json!({ "startup": startup_id });

        if was_saved {
            self.optimistic(
                |state| {
                    state.saved.remove(&startup_id);
                },
                |state| {
                    state.saved.insert(startup_id);
                },
                async {
                    self.api
                        .delete("investors/saved/", Some(&body))
                        .await
                        .map(|_| SaveOutcome::Removed)
                },
            )
            .await
        } else {
            self.optimistic(
                |state| {
                    state.saved.insert(startup_id);
                },
                |state| {
                    state.saved.remove(&startup_id);
                },
                async {
                    self.api
                        .post("investors/saved/", &body)
                        .await
                        .map(|_| SaveOutcome::Saved)
                },
            )
            .await
        }
    }

    /// Apply locally, confirm remotely, roll back on failure.
    async fn optimistic<T, Fut>(
        &self,
        apply: impl FnOnce(&mut LocalState),
        rollback: impl FnOnce(&mut LocalState),
        confirm: Fut,
    ) -> Result<T, AppError>
    where
        Fut: Future<Output = Result<T, AppError>>,
    {
        {
            let mut state = self.state();
            apply(&mut state);
        }
        match confirm.await {
            Ok(value) => Ok(value),
            Err(err) => {
                let mut state = self.state();
                rollback(&mut state);
                Err(err)
            }
        }
    }

    // ---- local accessors -------------------------------------------------

    pub fn startups(&self) -> Vec<Startup> {
        let state = self.state();
        state
            .order
            .iter()
            .filter_map(|id| state.startups.get(id).cloned())
            .collect()
    }

    pub fn startup(&self, id: i64) -> Option<Startup> {
        self.state().startups.get(&id).cloned()
    }

    pub fn requests(&self) -> Vec<FundingRequest> {
        let state = self.state();
        state
            .request_order
            .iter()
            .filter_map(|id| state.requests.get(id).cloned())
            .collect()
    }

    pub fn request(&self, id: i64) -> Option<FundingRequest> {
        self.state().requests.get(&id).cloned()
    }

    /// True when a pending request for this startup is in the local cache.
    pub fn has_pending_for(&self, startup_id: i64) -> bool {
        self.state()
            .requests
            .values()
            .any(|r| r.startup.id == startup_id && r.status == RequestStatus::Pending)
    }

    pub fn saved_ids(&self) -> HashSet<i64> {
        self.state().saved.clone()
    }

    pub fn is_saved(&self, startup_id: i64) -> bool {
        self.state().saved.contains(&startup_id)
    }

    /// Saved set joined against the startup cache, in listing order where
    /// known.
    pub fn saved_startups(&self) -> Vec<Startup> {
        let state = self.state();
        let mut listed: Vec<Startup> = state
            .order
            .iter()
            .filter(|id| state.saved.contains(id))
            .filter_map(|id| state.startups.get(id).cloned())
            .collect();
        let mut off_list: Vec<Startup> = state
            .saved
            .iter()
            .filter(|id| !state.order.contains(id))
            .filter_map(|id| state.startups.get(id).cloned())
            .collect();
        off_list.sort_by_key(|s| s.id);
        listed.extend(off_list);
        listed
    }

    /// Stores the transient amount input for a startup, keeping only digits
    /// and the decimal point.
    pub fn set_amount_input(&self, startup_id: i64, raw: &str) {
        let normalized: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        self.state().amount_inputs.insert(startup_id, normalized);
    }

    pub fn amount_input(&self, startup_id: i64) -> String {
        self.state()
            .amount_inputs
            .get(&startup_id)
            .cloned()
            .unwrap_or_default()
    }

    // ---- internals -------------------------------------------------------

    /// Merges the founder's own startups into the cache (and into nested
    /// request copies) so accepted amounts reflect the server's figures.
    async fn refresh_owned_startups(&self) -> Result<(), AppError> {
        let owned: Vec<Startup> = api::decode(self.api.get("startups/").await?)?;
        let fresh: HashMap<i64, Startup> = owned.into_iter().map(|s| (s.id, s)).collect();

        let mut state = self.state();
        for request in state.requests.values_mut() {
            if let Some(updated) = fresh.get(&request.startup.id) {
                request.startup = updated.clone();
            }
        }
        for (id, startup) in fresh {
            state.startups.insert(id, startup);
        }
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, LocalState> {
        self.state.lock().expect("lifecycle state poisoned")
    }
}
