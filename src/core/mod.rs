// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod scoring;

pub use filters::{expand_preference_types, is_candidate, matches_property_type, property_types_for};
pub use matcher::{Matcher, MatchResult, DEFAULT_MIN_SCORE};
pub use scoring::{calculate_score, score_breakdown};
