use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{Property, UserPreferenceProfile};

/// Request to generate matches for one user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    /// Replace the stored matches with the generated set
    #[serde(default = "default_persist")]
    pub persist: bool,
}

fn default_persist() -> bool {
    true
}

/// Query for stored matches
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StoredMatchesQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Ad-hoc scoring of a single preference/property pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub preferences: UserPreferenceProfile,
    pub property: Property,
}
