use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::api::{self, ApiClient};
use crate::error::AppError;
use crate::models::de_money_opt;

/// Founder profile as served by the backend's `/me/` endpoint. The record is
/// created on first read, so a fresh account gets an empty profile back
/// rather than a 404.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FounderProfile {
    #[serde(default, skip_serializing)]
    pub id: Option<i64>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub experience: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvestorProfile {
    #[serde(default, skip_serializing)]
    pub id: Option<i64>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default, deserialize_with = "de_money_opt")]
    pub investment_range_min: Option<f64>,
    #[serde(default, deserialize_with = "de_money_opt")]
    pub investment_range_max: Option<f64>,
    #[serde(default)]
    pub industries_of_interest: String,
    #[serde(default)]
    pub location: String,
}

const FOUNDER_ME: &str = "profiles/founder-profiles/me/";
const INVESTOR_ME: &str = "profiles/investor-profiles/me/";

/// The signed-in user's editable profile, one per role. Saves are partial
/// updates; the cache always reflects the last record the server echoed.
pub struct Profiles {
    api: Arc<ApiClient>,
    founder: Mutex<Option<FounderProfile>>,
    investor: Mutex<Option<InvestorProfile>>,
}

impl Profiles {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            founder: Mutex::new(None),
            investor: Mutex::new(None),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn load_founder(&self) -> Result<FounderProfile, AppError> {
        let profile: FounderProfile = api::decode(self.api.get(FOUNDER_ME).await?)?;
        *self.founder_slot() = Some(profile.clone());
        Ok(profile)
    }

    #[tracing::instrument(skip(self, profile))]
    pub async fn save_founder(&self, profile: &FounderProfile) -> Result<FounderProfile, AppError> {
        let body = serde_json::to_value(profile)?;
        let saved: FounderProfile = api::decode(self.api.put(FOUNDER_ME, &body).await?)?;
        *self.founder_slot() = Some(saved.clone());
        Ok(saved)
    }

    #[tracing::instrument(skip(self))]
    pub async fn load_investor(&self) -> Result<InvestorProfile, AppError> {
        let profile: InvestorProfile = api::decode(self.api.get(INVESTOR_ME).await?)?;
        *self.investor_slot() = Some(profile.clone());
        Ok(profile)
    }

    #[tracing::instrument(skip(self, profile))]
    pub async fn save_investor(
        &self,
        profile: &InvestorProfile,
    ) -> Result<InvestorProfile, AppError> {
        if let (Some(min), Some(max)) = (profile.investment_range_min, profile.investment_range_max)
        {
            if min > max {
                return Err(AppError::InvalidAmount(format!("{min} > {max}")));
            }
        }
        let body = serde_json::to_value(profile)?;
        let saved: InvestorProfile = api::decode(self.api.put(INVESTOR_ME, &body).await?)?;
        *self.investor_slot() = Some(saved.clone());
        Ok(saved)
    }

    pub fn founder(&self) -> Option<FounderProfile> {
        self.founder_slot().clone()
    }

    pub fn investor(&self) -> Option<InvestorProfile> {
        self.investor_slot().clone()
    }

    fn founder_slot(&self) -> MutexGuard<'_, Option<FounderProfile>> {
        self.founder.lock().expect("profile state poisoned")
    }

    fn investor_slot(&self) -> MutexGuard<'_, Option<InvestorProfile>> {
        self.investor.lock().expect("profile state poisoned")
    }
}
