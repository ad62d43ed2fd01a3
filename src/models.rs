use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Funding stage of a startup.
///
/// The backend stores this as free text, so unknown values survive a round
/// trip rather than failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Idea,
    Prototype,
    Mvp,
    Seed,
    SeriesA,
    SeriesB,
    Other(String),
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Idea => "Idea",
            Stage::Prototype => "Prototype",
            Stage::Mvp => "MVP",
            Stage::Seed => "Seed",
            Stage::SeriesA => "Series A",
            Stage::SeriesB => "Series B",
            Stage::Other(raw) => raw,
        }
    }
}

impl From<&str> for Stage {
    fn from(raw: &str) -> Self {
        match raw {
            "Idea" => Stage::Idea,
            "Prototype" => Stage::Prototype,
            "MVP" => Stage::Mvp,
            "Seed" => Stage::Seed,
            "Series A" => Stage::SeriesA,
            "Series B" => Stage::SeriesB,
            other => Stage::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Stage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Stage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Stage::from(raw.as_str()))
    }
}

/// Founder reference as it appears on startup payloads: either a bare primary
/// key or a nested profile, depending on the serializer in play.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FounderRef {
    Id(i64),
    Profile(FounderSummary),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FounderSummary {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorSummary {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Startup {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default, deserialize_with = "de_stage_opt")]
    pub stage: Option<Stage>,
    #[serde(deserialize_with = "de_money")]
    pub funding_goal: f64,
    /// Server-maintained; absent on some payloads and treated as zero for
    /// display. The client never increments this locally.
    #[serde(default, deserialize_with = "de_money_opt")]
    pub amount_raised: Option<f64>,
    /// Percentage of equity offered for the full funding goal.
    #[serde(default, deserialize_with = "de_money_opt")]
    pub equity: Option<f64>,
    /// Computed server-side from goal and equity.
    #[serde(default, deserialize_with = "de_money_opt")]
    pub valuation: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
    /// File reference (relative media path or absolute URL).
    #[serde(default)]
    pub pitch_deck: Option<String>,
    #[serde(default)]
    pub team_size: Option<u32>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub founder: Option<FounderRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Startup {
    /// Raised amount with the absent-field fallback applied.
    pub fn raised(&self) -> f64 {
        self.amount_raised.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    /// Accepted and rejected are terminal; no client logic transitions out of
    /// them.
    pub fn is_terminal(self) -> bool {
        self != RequestStatus::Pending
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

/// A founder's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accepted,
    Rejected,
}

impl Decision {
    pub fn status(self) -> RequestStatus {
        match self {
            Decision::Accepted => RequestStatus::Accepted,
            Decision::Rejected => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingRequest {
    pub id: i64,
    /// Nested on read; creation posts `startup_id` instead.
    pub startup: Startup,
    #[serde(default)]
    pub investor: Option<InvestorSummary>,
    #[serde(deserialize_with = "de_money")]
    pub amount: f64,
    pub status: RequestStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Saved-startup entry. The listing endpoint has served both nested startups
/// and bare ids over time, so both shapes decode.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedStartup {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub startup: Option<SavedRef>,
    #[serde(default)]
    pub startup_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SavedRef {
    Id(i64),
    Full(Box<Startup>),
}

impl SavedStartup {
    pub fn target_id(&self) -> Option<i64> {
        match (&self.startup, self.startup_id) {
            (Some(SavedRef::Full(startup)), _) => Some(startup.id),
            (Some(SavedRef::Id(id)), _) => Some(*id),
            (None, Some(id)) => Some(id),
            (None, None) => None,
        }
    }

    /// Full startup payload when the listing nested one.
    pub fn into_startup(self) -> Option<Startup> {
        match self.startup {
            Some(SavedRef::Full(startup)) => Some(*startup),
            _ => None,
        }
    }
}

/// Founder-side create/update payload. Serialized directly for JSON bodies;
/// the portfolio module flattens it into a multipart form when a pitch deck
/// rides along.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StartupDraft {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub industry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    pub funding_goal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equity: Option<f64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub website: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_size: Option<u32>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub location: String,
}

// DRF decimal fields arrive as strings, plain numbers arrive as numbers;
// accept both.
fn money_from_value<E: serde::de::Error>(value: Value) -> Result<f64, E> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| E::custom("amount out of f64 range")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| E::custom(format!("bad decimal string {s:?}: {e}"))),
        other => Err(E::custom(format!("unexpected amount encoding: {other}"))),
    }
}

fn de_money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    money_from_value(Value::deserialize(deserializer)?)
}

pub(crate) fn de_money_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => money_from_value(value).map(Some),
    }
}

fn de_stage_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Stage>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(|s| Stage::from(s.as_str())))
}
