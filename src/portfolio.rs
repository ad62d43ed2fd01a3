use std::sync::{Arc, Mutex, MutexGuard};

use reqwest::multipart::{Form, Part};

use crate::api::{self, ApiClient};
use crate::error::AppError;
use crate::models::{Startup, StartupDraft};

/// Pitch deck attachment for a create or update.
#[derive(Debug, Clone)]
pub struct PitchDeck {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Founder-side management of the signed-in user's startups.
pub struct Portfolio {
    api: Arc<ApiClient>,
    startups: Mutex<Vec<Startup>>,
}

impl Portfolio {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            startups: Mutex::new(Vec::new()),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Vec<Startup>, AppError> {
        let listed: Vec<Startup> = api::decode(self.api.get("startups/").await?)?;
        *self.lock() = listed.clone();
        Ok(listed)
    }

    pub fn startups(&self) -> Vec<Startup> {
        self.lock().clone()
    }

    #[tracing::instrument(skip(self, draft, deck))]
    pub async fn create(
        &self,
        draft: &StartupDraft,
        deck: Option<PitchDeck>,
    ) -> Result<Startup, AppError> {
        validate(draft)?;
        let value = match deck {
            Some(deck) => {
                self.api
                    .post_multipart("startups/", draft_form(draft, deck))
                    .await?
            }
            None => {
                self.api
                    .post("startups/", &serde_json::to_value(draft)?)
                    .await?
            }
        };
        let created: Startup = api::decode(value)?;
        self.lock().push(created.clone());
        Ok(created)
    }

    #[tracing::instrument(skip(self, draft, deck))]
    pub async fn update(
        &self,
        id: i64,
        draft: &StartupDraft,
        deck: Option<PitchDeck>,
    ) -> Result<Startup, AppError> {
        validate(draft)?;
        let path = format!("startups/{id}/");
        let value = match deck {
            Some(deck) => self.api.put_multipart(&path, draft_form(draft, deck)).await?,
            None => self.api.put(&path, &serde_json::to_value(draft)?).await?,
        };
        let updated: Startup = api::decode(value)?;
        let mut startups = self.lock();
        match startups.iter_mut().find(|s| s.id == id) {
            Some(slot) => *slot = updated.clone(),
            None => startups.push(updated.clone()),
        }
        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let path = format!("startups/{id}/");
        self.api.delete(&path, None).await?;
        self.lock().retain(|s| s.id != id);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Startup>> {
        self.startups.lock().expect("portfolio state poisoned")
    }
}

/// Required-field and range checks, surfaced before any dispatch.
fn validate(draft: &StartupDraft) -> Result<(), AppError> {
    if draft.name.trim().is_empty() {
        return Err(AppError::MissingField("name".to_string()));
    }
    if !draft.funding_goal.is_finite() || draft.funding_goal <= 0.0 {
        return Err(AppError::InvalidAmount(draft.funding_goal.to_string()));
    }
    if let Some(equity) = draft.equity {
        if !(0.0..=100.0).contains(&equity) {
            return Err(AppError::InvalidEquity(equity));
        }
    }
    Ok(())
}

/// Flattens a draft into the multipart form the upload endpoint expects.
fn draft_form(draft: &StartupDraft, deck: PitchDeck) -> Form {
    let mut form = Form::new()
        .text("name", draft.name.clone())
        .text("funding_goal", draft.funding_goal.to_string());
    if !draft.industry.is_empty() {
        form = form.text("industry", draft.industry.clone());
    }
    if let Some(stage) = &draft.stage {
        form = form.text("stage", stage.to_string());
    }
    if let Some(equity) = draft.equity {
        form = form.text("equity", equity.to_string());
    }
    if !draft.description.is_empty() {
        form = form.text("description", draft.description.clone());
    }
    if !draft.website.is_empty() {
        form = form.text("website", draft.website.clone());
    }
    if let Some(team_size) = draft.team_size {
        form = form.text("team_size", team_size.to_string());
    }
    if !draft.location.is_empty() {
        form = form.text("location", draft.location.clone());
    }
    form.part(
        "pitch_deck",
        Part::bytes(deck.bytes).file_name(deck.file_name),
    )
}
