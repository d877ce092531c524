use std::sync::Arc;

use crate::core::Matcher;
use crate::models::{PropertyMatch, STATUS_AVAILABLE};
use crate::services::policy::RequestPolicy;
use crate::services::repository::MatchRepository;

/// Generates, persists and batch-regenerates property matches
///
/// Failures never escape this type: fetch problems yield an empty match
/// list, persistence problems yield `false`, and a failed user listing makes
/// the batch report zero processed users. Every failure is logged.
#[derive(Clone)]
pub struct MatchService {
    repository: Arc<dyn MatchRepository>,
    matcher: Matcher,
    policy: RequestPolicy,
}

impl MatchService {
    pub fn new(repository: Arc<dyn MatchRepository>, matcher: Matcher, policy: RequestPolicy) -> Self {
        Self {
            repository,
            matcher,
            policy,
        }
    }

    pub fn repository(&self) -> &Arc<dyn MatchRepository> {
        &self.repository
    }

    pub fn policy(&self) -> &RequestPolicy {
        &self.policy
    }

    /// Score every available property for one user
    ///
    /// Returns matches at or above the threshold, best first, ties in fetch
    /// order. Returns an empty list if the profile or properties cannot be
    /// fetched.
    pub async fn generate_matches_for_user(&self, user_id: &str) -> Vec<PropertyMatch> {
        let repo = &self.repository;

        let preferences = match self
            .policy
            .run("fetch preferences", || repo.fetch_preferences(user_id))
            .await
        {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::error!("Failed to fetch preferences for {}: {}", user_id, e);
                return Vec::new();
            }
        };

        let properties = match self
            .policy
            .run("fetch properties", || repo.fetch_properties_by_status(STATUS_AVAILABLE))
            .await
        {
            Ok(properties) => properties,
            Err(e) => {
                tracing::error!("Failed to fetch available properties for {}: {}", user_id, e);
                return Vec::new();
            }
        };

        let result = self.matcher.rank(user_id, &preferences, &properties);

        tracing::debug!(
            "Generated {} matches for user {} (from {} properties)",
            result.matches.len(),
            user_id,
            result.total_candidates
        );

        result.matches
    }

    /// Replace the stored matches of the user owning `matches`
    ///
    /// An empty slice is a successful no-op. The owner is taken from the
    /// first match.
    pub async fn persist_matches(&self, matches: &[PropertyMatch]) -> bool {
        let Some(first) = matches.first() else {
            return true;
        };
        let user_id = first.user_id.as_str();
        let repo = &self.repository;

        match self
            .policy
            .run("replace matches", || repo.replace_matches(user_id, matches))
            .await
        {
            Ok(()) => {
                tracing::debug!("Persisted {} matches for user {}", matches.len(), user_id);
                true
            }
            Err(e) => {
                tracing::error!("Failed to persist matches for {}: {}", user_id, e);
                false
            }
        }
    }

    /// Generate and persist matches for every user, one user at a time
    ///
    /// Returns the number of users whose matches were persisted. A failing
    /// user is logged and skipped.
    pub async fn regenerate_all_matches(&self) -> usize {
        let repo = &self.repository;

        let user_ids = match self
            .policy
            .run("fetch user ids", || repo.fetch_user_ids())
            .await
        {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!("Failed to fetch user ids, aborting regeneration: {}", e);
                return 0;
            }
        };

        tracing::info!(
            "Regenerating matches for {} users ({} backend)",
            user_ids.len(),
            repo.backend_name()
        );

        let mut processed = 0;

        for user_id in &user_ids {
            let matches = self.generate_matches_for_user(user_id).await;

            if self.persist_matches(&matches).await {
                processed += 1;
            } else {
                tracing::warn!("Skipping user {} after persist failure", user_id);
            }
        }

        tracing::info!(
            "Regenerated matches for {}/{} users",
            processed,
            user_ids.len()
        );

        processed
    }
}
