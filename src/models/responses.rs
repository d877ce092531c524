use serde::{Deserialize, Serialize};
use crate::models::domain::{PropertyMatch, ScoreBreakdown};

/// Response for the generate endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateMatchesResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub matches: Vec<PropertyMatch>,
    /// `None` when persistence was not requested
    pub persisted: Option<bool>,
}

/// Response for the batch regeneration endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenerateResponse {
    #[serde(rename = "processedUsers")]
    pub processed_users: usize,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
}

/// Stored matches for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMatchesResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub matches: Vec<PropertyMatch>,
    pub count: usize,
}

/// Score and per-factor points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: u8,
    pub breakdown: ScoreBreakdown,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
