use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Property, PropertyMatch, UserPreferenceProfile};
use crate::services::{postgres::PostgresError, supabase::SupabaseError};

/// Errors surfaced by a data-access backend
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Supabase error: {0}")]
    Supabase(#[from] SupabaseError),

    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] PostgresError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// Returns true if retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            RepositoryError::Timeout(_) | RepositoryError::Unavailable(_) => true,
            RepositoryError::Supabase(e) => e.is_transient(),
            RepositoryError::Postgres(e) => e.is_transient(),
            RepositoryError::NotFound(_) => false,
        }
    }
}

/// Data-access capabilities the matching engine depends on
///
/// Backends are injected into [`crate::services::MatchService`] so the engine
/// never reaches for a global client.
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Read a user's preference profile; `NotFound` if there is none
    async fn fetch_preferences(&self, user_id: &str) -> Result<UserPreferenceProfile, RepositoryError>;

    /// Read every property with the given status, in backend order
    async fn fetch_properties_by_status(&self, status: &str) -> Result<Vec<Property>, RepositoryError>;

    /// Read the ids of every user
    async fn fetch_user_ids(&self) -> Result<Vec<String>, RepositoryError>;

    /// Remove every stored match for a user
    async fn delete_matches(&self, user_id: &str) -> Result<(), RepositoryError>;

    /// Insert a batch of match rows
    async fn insert_matches(&self, matches: &[PropertyMatch]) -> Result<(), RepositoryError>;

    /// Read stored matches for a user, best first
    async fn fetch_matches(&self, user_id: &str) -> Result<Vec<PropertyMatch>, RepositoryError>;

    /// Replace a user's stored matches with `matches`
    ///
    /// The default runs delete then insert as two calls. Backends with
    /// transactions override this to make the replacement atomic.
    async fn replace_matches(
        &self,
        user_id: &str,
        matches: &[PropertyMatch],
    ) -> Result<(), RepositoryError> {
        self.delete_matches(user_id).await?;
        self.insert_matches(matches).await
    }

    /// Name used in logs
    fn backend_name(&self) -> &'static str;

    /// Cheap liveness probe
    async fn health_check(&self) -> bool {
        true
    }
}
