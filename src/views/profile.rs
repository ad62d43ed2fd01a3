use std::sync::Arc;

use crate::notify::Notifier;
use crate::profile::{FounderProfile, InvestorProfile, Profiles};
use crate::session::Role;
use crate::views::format_inr;

/// Profile surface for the signed-in user, founder or investor.
pub struct ProfileView {
    profiles: Arc<Profiles>,
    notifier: Arc<Notifier>,
}

impl ProfileView {
    pub fn new(profiles: Arc<Profiles>, notifier: Arc<Notifier>) -> Self {
        Self {
            profiles,
            notifier,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn load(&self, role: Role) {
        let result = match role {
            Role::Founder => self.profiles.load_founder().await.map(|_| ()),
            Role::Investor => self.profiles.load_investor().await.map(|_| ()),
        };
        if let Err(err) = result {
            tracing::error!(%err, "failed to load profile");
            self.notifier.error("Load failed", "Could not load profile");
        }
    }

    pub async fn save_founder(&self, profile: &FounderProfile) {
        match self.profiles.save_founder(profile).await {
            Ok(_) => {
                self.notifier
                    .success("Saved", "Profile updated successfully");
            }
            Err(err) => {
                self.notifier.error("Save failed", &err.to_string());
            }
        }
    }

    pub async fn save_investor(&self, profile: &InvestorProfile) {
        match self.profiles.save_investor(profile).await {
            Ok(_) => {
                self.notifier
                    .success("Saved", "Profile updated successfully");
            }
            Err(err) => {
                self.notifier.error("Save failed", &err.to_string());
            }
        }
    }

    pub fn render(&self, role: Role) -> String {
        match role {
            Role::Founder => match self.profiles.founder() {
                None => "No profile loaded.\n".to_string(),
                Some(profile) => {
                    let mut out = String::new();
                    push_field(&mut out, "bio", &profile.bio);
                    push_field(&mut out, "linkedin", &profile.linkedin);
                    push_field(&mut out, "experience", &profile.experience);
                    if out.is_empty() {
                        out.push_str("Profile is empty.\n");
                    }
                    out
                }
            },
            Role::Investor => match self.profiles.investor() {
                None => "No profile loaded.\n".to_string(),
                Some(profile) => {
                    let mut out = String::new();
                    push_field(&mut out, "bio", &profile.bio);
                    push_field(&mut out, "linkedin", &profile.linkedin);
                    if let (Some(min), Some(max)) =
                        (profile.investment_range_min, profile.investment_range_max)
                    {
                        out.push_str(&format!(
                            "range: {} to {}\n",
                            format_inr(min),
                            format_inr(max)
                        ));
                    }
                    push_field(&mut out, "interests", &profile.industries_of_interest);
                    push_field(&mut out, "location", &profile.location);
                    if out.is_empty() {
                        out.push_str("Profile is empty.\n");
                    }
                    out
                }
            },
        }
    }
}

fn push_field(out: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        out.push_str(&format!("{label}: {value}\n"));
    }
}
