use std::sync::Arc;

use crate::lifecycle::{compute_progress, Lifecycle, SaveOutcome};
use crate::notify::Notifier;
use crate::views::format_inr;

/// Investor's saved-startups surface.
pub struct SavedView {
    lifecycle: Arc<Lifecycle>,
    notifier: Arc<Notifier>,
}

impl SavedView {
    pub fn new(lifecycle: Arc<Lifecycle>, notifier: Arc<Notifier>) -> Self {
        Self {
            lifecycle,
            notifier,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn load(&self) {
        if let Err(err) = self.lifecycle.refresh_saved().await {
            tracing::error!(%err, "failed to refresh saved startups");
            self.notifier
                .error("Load failed", "Could not load saved startups");
        }
    }

    /// Optimistic removal; the lifecycle module has already rolled the set
    /// back by the time an error lands here.
    pub async fn unsave(&self, startup_id: i64) {
        match self.lifecycle.toggle_save(startup_id).await {
            Ok(SaveOutcome::Removed) => {
                self.notifier
                    .success("Removed", "Startup removed from saved list");
            }
            Ok(SaveOutcome::Saved) => {
                // Only reachable if the entry was already gone locally.
                self.notifier
                    .success("Saved", "Startup added to saved list");
            }
            Err(err) => {
                self.notifier.error("Unsave failed", &err.to_string());
            }
        }
    }

    pub fn render(&self) -> String {
        let startups = self.lifecycle.saved_startups();
        if startups.is_empty() {
            return "No saved startups yet.\n".to_string();
        }
        let mut out = String::new();
        for startup in &startups {
            let progress = compute_progress(startup);
            out.push_str(&format!(
                "#{} {} — goal {} remaining {}{}\n",
                startup.id,
                startup.name,
                format_inr(startup.funding_goal),
                format_inr(progress.remaining),
                if progress.fully_funded {
                    " (fully funded)"
                } else {
                    ""
                },
            ));
        }
        out
    }
}
