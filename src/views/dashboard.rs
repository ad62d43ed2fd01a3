use std::sync::{Arc, Mutex};

use crate::lifecycle::{compute_equity, Lifecycle};
use crate::models::{FundingRequest, RequestStatus, Startup};
use crate::notify::Notifier;
use crate::portfolio::Portfolio;
use crate::views::format_inr;

/// Founder home: portfolio totals plus the pending-request count.
pub struct FounderDashboard {
    portfolio: Arc<Portfolio>,
    lifecycle: Arc<Lifecycle>,
    notifier: Arc<Notifier>,
}

impl FounderDashboard {
    pub fn new(portfolio: Arc<Portfolio>, lifecycle: Arc<Lifecycle>, notifier: Arc<Notifier>) -> Self {
        Self {
            portfolio,
            lifecycle,
            notifier,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn load(&self) {
        let (startups, requests) =
            futures::future::join(self.portfolio.refresh(), self.lifecycle.refresh_requests())
                .await;
        if let Err(err) = startups.and(requests) {
            tracing::error!(%err, "failed to load founder dashboard");
            self.notifier
                .error("Load failed", "Could not load dashboard");
        }
    }

    pub fn render(&self) -> String {
        let startups = self.portfolio.startups();
        let total_goal: f64 = startups.iter().map(|s| s.funding_goal).sum();
        let total_raised: f64 = startups.iter().map(Startup::raised).sum();
        let pending = self
            .lifecycle
            .requests()
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count();

        format!(
            "Startups: {}\nTotal goal: {}\nTotal raised: {}\nPending requests: {}\n",
            startups.len(),
            format_inr(total_goal),
            format_inr(total_raised),
            pending,
        )
    }
}

/// Investor home: accepted investments with per-holding equity estimates.
pub struct InvestorDashboard {
    lifecycle: Arc<Lifecycle>,
    notifier: Arc<Notifier>,
    holdings: Mutex<Vec<FundingRequest>>,
}

impl InvestorDashboard {
    pub fn new(lifecycle: Arc<Lifecycle>, notifier: Arc<Notifier>) -> Self {
        Self {
            lifecycle,
            notifier,
            holdings: Mutex::new(Vec::new()),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn load(&self) {
        match self.lifecycle.my_investments().await {
            Ok(holdings) => {
                *self.holdings.lock().expect("holdings poisoned") = holdings;
            }
            Err(err) => {
                tracing::error!(%err, "failed to load investments");
                self.notifier
                    .error("Load failed", "Could not load investments");
            }
        }
    }

    pub fn holdings(&self) -> Vec<FundingRequest> {
        self.holdings.lock().expect("holdings poisoned").clone()
    }

    pub fn render(&self) -> String {
        let holdings = self.holdings();
        if holdings.is_empty() {
            return "No accepted investments yet.\n".to_string();
        }
        let mut out = String::new();
        let mut deployed = 0.0;
        for holding in &holdings {
            deployed += holding.amount;
            let raised = displayed_raised(&holding.startup, &holdings);
            out.push_str(&format!(
                "{} — invested {} (raised {} of {})",
                holding.startup.name,
                format_inr(holding.amount),
                format_inr(raised),
                format_inr(holding.startup.funding_goal),
            ));
            if let Some(equity) = compute_equity(&holding.startup, holding.amount) {
                out.push_str(&format!(" ≈{equity:.2}% equity"));
            }
            out.push('\n');
        }
        out.push_str(&format!("Total deployed: {}\n", format_inr(deployed)));
        out
    }
}

/// The server-reported raised amount is authoritative; summing the investor's
/// own accepted holdings is only a display fallback for payloads where the
/// field is absent.
pub fn displayed_raised(startup: &Startup, holdings: &[FundingRequest]) -> f64 {
    startup.amount_raised.unwrap_or_else(|| {
        holdings
            .iter()
            .filter(|h| h.startup.id == startup.id && h.status == RequestStatus::Accepted)
            .map(|h| h.amount)
            .sum()
    })
}
