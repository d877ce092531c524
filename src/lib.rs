//! Estate Match - property matching engine for the real estate marketplace
//!
//! Scores available properties against each user's stored preferences and
//! keeps a per-user set of recommended matches up to date.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_score, score_breakdown, Matcher};
pub use models::{Budget, Property, PropertyMatch, ScoreBreakdown, UserPreferenceProfile};
pub use services::{MatchRepository, MatchService, RepositoryError, RequestPolicy};
