use crate::models::{Property, PropertyMatch, UserPreferenceProfile};
use crate::services::repository::{MatchRepository, RepositoryError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with Supabase
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Server error: {0}")]
    ServerError(StatusCode),

    #[error("Unauthorized: invalid service key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl SupabaseError {
    /// Connection problems and 5xx responses are worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            SupabaseError::RequestError(e) => e.is_timeout() || e.is_connect(),
            SupabaseError::ServerError(_) => true,
            _ => false,
        }
    }
}

/// Table names in the Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub user_preferences: String,
    pub properties: String,
    pub profiles: String,
    pub property_matches: String,
}

/// Supabase (PostgREST) client
///
/// Handles all communication with the hosted backend:
/// - Fetching user preference profiles
/// - Listing properties by status
/// - Listing user ids
/// - Replacing stored matches
///
/// PostgREST has no multi-request transactions, so replacing matches is a
/// delete followed by an insert.
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: Client,
    tables: SupabaseTables,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: String,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        api_key: String,
        tables: SupabaseTables,
        timeout: Duration,
    ) -> Result<Self, SupabaseError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            tables,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Map a non-success status to an error, reading the body for context
    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SupabaseError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
        tracing::error!("Failed to {}: {} - {}", action, status, body);

        if status.is_server_error() {
            Err(SupabaseError::ServerError(status))
        } else {
            Err(SupabaseError::ApiError(format!("Failed to {}: {}", action, status)))
        }
    }

    async fn get_rows(&self, url: &str, action: &str) -> Result<Vec<Value>, SupabaseError> {
        let response = self.authorized(self.client.get(url)).send().await?;
        let response = Self::check(response, action).await?;

        let json: Value = response.json().await?;
        match json {
            Value::Array(rows) => Ok(rows),
            _ => Err(SupabaseError::InvalidResponse("Expected a JSON array of rows".into())),
        }
    }
}

#[async_trait]
impl MatchRepository for SupabaseClient {
    async fn fetch_preferences(&self, user_id: &str) -> Result<UserPreferenceProfile, RepositoryError> {
        let url = format!(
            "{}?select=*&user_id=eq.{}&limit=1",
            self.table_url(&self.tables.user_preferences),
            urlencoding::encode(user_id)
        );

        tracing::debug!("Fetching preferences from: {}", url);

        let rows = self.get_rows(&url, "fetch preferences").await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::NotFound(format!("Preferences not found for user {}", user_id)))?;

        let mut profile: UserPreferenceProfile = serde_json::from_value(row).map_err(|e| {
            SupabaseError::InvalidResponse(format!("Failed to parse preferences: {}", e))
        })?;
        if profile.user_id.is_empty() {
            profile.user_id = user_id.to_string();
        }

        Ok(profile)
    }

    async fn fetch_properties_by_status(&self, status: &str) -> Result<Vec<Property>, RepositoryError> {
        let url = format!(
            "{}?select=*&status=eq.{}",
            self.table_url(&self.tables.properties),
            urlencoding::encode(status)
        );

        let rows = self.get_rows(&url, "fetch properties").await?;
        let total = rows.len();

        // Rows that do not parse (e.g. missing price) are skipped
        let properties: Vec<Property> = rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect();

        if properties.len() < total {
            tracing::warn!(
                "Skipped {} malformed property rows",
                total - properties.len()
            );
        }

        tracing::debug!("Fetched {} properties with status {}", properties.len(), status);

        Ok(properties)
    }

    async fn fetch_user_ids(&self) -> Result<Vec<String>, RepositoryError> {
        let url = format!("{}?select=id", self.table_url(&self.tables.profiles));

        let rows = self.get_rows(&url, "fetch user ids").await?;
        let ids = rows
            .into_iter()
            .map(|row| serde_json::from_value::<IdRow>(row).map(|r| r.id))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse user ids: {}", e)))?;

        Ok(ids)
    }

    async fn delete_matches(&self, user_id: &str) -> Result<(), RepositoryError> {
        let url = format!(
            "{}?user_id=eq.{}",
            self.table_url(&self.tables.property_matches),
            urlencoding::encode(user_id)
        );

        let response = self
            .authorized(self.client.delete(&url))
            .send()
            .await
            .map_err(SupabaseError::from)?;
        Self::check(response, "delete matches").await?;

        tracing::debug!("Deleted stored matches for user {}", user_id);
        Ok(())
    }

    async fn insert_matches(&self, matches: &[PropertyMatch]) -> Result<(), RepositoryError> {
        if matches.is_empty() {
            return Ok(());
        }

        let rows: Vec<Value> = matches
            .iter()
            .map(|m| {
                serde_json::json!({
                    "user_id": m.user_id,
                    "property_id": m.property_id,
                    "match_score": m.match_score,
                })
            })
            .collect();

        let response = self
            .authorized(self.client.post(self.table_url(&self.tables.property_matches)))
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await
            .map_err(SupabaseError::from)?;
        Self::check(response, "insert matches").await?;

        tracing::debug!("Inserted {} matches", matches.len());
        Ok(())
    }

    async fn fetch_matches(&self, user_id: &str) -> Result<Vec<PropertyMatch>, RepositoryError> {
        let url = format!(
            "{}?select=user_id,property_id,match_score&user_id=eq.{}&order=match_score.desc",
            self.table_url(&self.tables.property_matches),
            urlencoding::encode(user_id)
        );

        let rows = self.get_rows(&url, "fetch matches").await?;
        let matches = rows
            .into_iter()
            .map(serde_json::from_value::<PropertyMatch>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse matches: {}", e)))?;

        Ok(matches)
    }

    fn backend_name(&self) -> &'static str {
        "supabase"
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}?select=id&limit=1", self.table_url(&self.tables.profiles));
        self.get_rows(&url, "health check").await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supabase_client_creation() {
        let tables = SupabaseTables {
            user_preferences: "user_preferences".to_string(),
            properties: "properties".to_string(),
            profiles: "profiles".to_string(),
            property_matches: "property_matches".to_string(),
        };

        let client = SupabaseClient::new(
            "https://project.supabase.co/".to_string(),
            "test_key".to_string(),
            tables,
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(client.api_key, "test_key");
        assert_eq!(
            client.table_url("properties"),
            "https://project.supabase.co/rest/v1/properties"
        );
    }

    #[test]
    fn test_server_errors_are_transient() {
        assert!(SupabaseError::ServerError(StatusCode::BAD_GATEWAY).is_transient());
        assert!(!SupabaseError::Unauthorized.is_transient());
        assert!(!SupabaseError::ApiError("bad filter".into()).is_transient());
    }
}
