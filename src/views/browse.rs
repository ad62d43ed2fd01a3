use std::sync::Arc;

use crate::error::AppError;
use crate::lifecycle::{compute_equity, compute_progress, Lifecycle, SaveOutcome};
use crate::models::Startup;
use crate::notify::Notifier;
use crate::views::format_inr;

/// Investor browse surface: list, save toggle, amount entry, request submit.
pub struct BrowseView {
    lifecycle: Arc<Lifecycle>,
    notifier: Arc<Notifier>,
}

impl BrowseView {
    pub fn new(lifecycle: Arc<Lifecycle>, notifier: Arc<Notifier>) -> Self {
        Self {
            lifecycle,
            notifier,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn load(&self) {
        if let Err(err) = self.lifecycle.bootstrap_investor().await {
            tracing::error!(%err, "failed to load browse data");
            self.notifier
                .error("Load failed", "Could not load startups");
        }
    }

    pub fn enter_amount(&self, startup_id: i64, raw: &str) {
        self.lifecycle.set_amount_input(startup_id, raw);
    }

    pub async fn toggle_save(&self, startup_id: i64) {
        match self.lifecycle.toggle_save(startup_id).await {
            Ok(SaveOutcome::Saved) => {
                self.notifier
                    .success("Saved", "Startup added to saved list");
            }
            Ok(SaveOutcome::Removed) => {
                self.notifier
                    .success("Removed", "Startup removed from saved list");
            }
            Err(err) => {
                self.notifier.error("Save failed", &err.to_string());
            }
        }
    }

    /// Submits the buffered amount for a startup. Rollback (there is none to
    /// do for submits) and validation both happen before the notification.
    pub async fn send_request(&self, startup_id: i64) {
        let raw = self.lifecycle.amount_input(startup_id);
        match self.lifecycle.submit_request(startup_id, &raw).await {
            Ok(_) => {
                self.notifier
                    .success("Request sent", "Founder will review your request");
            }
            Err(err) => {
                self.notifier.error(toast_title(&err), &err.to_string());
            }
        }
    }

    pub fn render(&self) -> String {
        let startups = self.lifecycle.startups();
        if startups.is_empty() {
            return "No startups to browse yet.\n".to_string();
        }
        let mut out = String::new();
        for startup in &startups {
            out.push_str(&self.render_card(startup));
        }
        out
    }

    fn render_card(&self, startup: &Startup) -> String {
        let progress = compute_progress(startup);
        let mut out = format!("#{} {}", startup.id, startup.name);
        if let Some(stage) = &startup.stage {
            out.push_str(&format!(" [{stage}]"));
        }
        if self.lifecycle.is_saved(startup.id) {
            out.push_str(" ★saved");
        }
        if self.lifecycle.has_pending_for(startup.id) {
            out.push_str(" (requested)");
        }
        out.push('\n');

        if !startup.industry.is_empty() || !startup.location.is_empty() {
            out.push_str(&format!(
                "    {} {}\n",
                startup.industry, startup.location
            ));
        }
        out.push_str(&format!(
            "    goal {} raised {}",
            format_inr(startup.funding_goal),
            format_inr(startup.raised()),
        ));
        if progress.fully_funded {
            out.push_str(" — fully funded\n");
        } else {
            out.push_str(&format!(" remaining {}\n", format_inr(progress.remaining)));
        }
        if let Some(equity) = startup.equity {
            out.push_str(&format!("    {equity}% equity for full goal"));
            if let Some(valuation) = startup.valuation {
                out.push_str(&format!(" (valuation {})", format_inr(valuation)));
            }
            out.push('\n');
        }

        let input = self.lifecycle.amount_input(startup.id);
        if !input.is_empty() {
            out.push_str(&format!("    amount entered: {input}"));
            if let Some(estimate) = input
                .parse::<f64>()
                .ok()
                .and_then(|amount| compute_equity(startup, amount))
            {
                out.push_str(&format!(" (≈{estimate:.2}% equity)"));
            }
            out.push('\n');
        }
        out
    }
}

fn toast_title(err: &AppError) -> &'static str {
    match err {
        AppError::InvalidAmount(_) => "Invalid amount",
        AppError::AmountTooLarge { .. } => "Too large",
        _ => "Request failed",
    }
}
