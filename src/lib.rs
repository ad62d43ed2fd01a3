//! Client-side core for the VentureLink founder/investor marketplace.
//!
//! Founders list startups and decide on incoming funding requests; investors
//! browse, bookmark, and submit requests. The backend is an external REST
//! service (session cookie + CSRF token); this crate owns the client-visible
//! state and nothing server-side.
//!
//! Module map:
//! - [`api`]: authenticated HTTP adapter (reqwest, cookie store, CSRF).
//! - [`lifecycle`]: funding-request lifecycle with validation, submission,
//!   founder decisions, optimistic save/unsave, derived metrics.
//! - [`portfolio`]: founder-side startup CRUD, pitch-deck upload included.
//! - [`profile`]: the signed-in user's editable profile, per role.
//! - [`session`]: session context and the role guard.
//! - [`notify`]: stacked auto-dismissing notifications.
//! - [`views`]: page bindings over the above.

pub mod api;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod portfolio;
pub mod profile;
pub mod session;
pub mod views;
