use crate::models::{Budget, Property, PropertyMatch, UserPreferenceProfile};
use crate::services::repository::{MatchRepository, RepositoryError};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PostgresError {
    /// Pool exhaustion and dropped connections are worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PostgresError::SqlxError(sqlx::Error::PoolTimedOut)
                | PostgresError::SqlxError(sqlx::Error::Io(_))
                | PostgresError::SqlxError(sqlx::Error::PoolClosed)
        )
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(value: sqlx::Error) -> Self {
        RepositoryError::Postgres(PostgresError::SqlxError(value))
    }
}

/// Direct PostgreSQL backend
///
/// Reads the same tables the hosted backend exposes and replaces a user's
/// matches inside a single transaction, so a failed insert leaves the old
/// rows untouched.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Wrap an existing pool (migrations are not run)
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn preferences_from_row(row: &PgRow) -> Result<UserPreferenceProfile, sqlx::Error> {
    let budget: Option<Json<Budget>> = row.try_get("budget")?;

    Ok(UserPreferenceProfile {
        user_id: row.try_get("user_id")?,
        budget: budget.map(|b| b.0),
        location: row.try_get("location")?,
        property_preference_types: row
            .try_get::<Option<Vec<String>>, _>("property_preference_types")?
            .unwrap_or_default(),
        bedrooms: row.try_get("bedrooms")?,
        bathrooms: row.try_get("bathrooms")?,
    })
}

fn property_from_row(row: &PgRow) -> Result<Property, sqlx::Error> {
    Ok(Property {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        price: row.try_get("price")?,
        location: row.try_get::<Option<String>, _>("location")?.unwrap_or_default(),
        property_type: row.try_get::<Option<String>, _>("type")?.unwrap_or_default(),
        bedrooms: row.try_get("bedrooms")?,
        bathrooms: row.try_get("bathrooms")?,
        status: row.try_get("status")?,
    })
}

fn match_from_row(row: &PgRow) -> Result<PropertyMatch, sqlx::Error> {
    let score: i16 = row.try_get("match_score")?;

    Ok(PropertyMatch {
        user_id: row.try_get("user_id")?,
        property_id: row.try_get("property_id")?,
        match_score: score.clamp(0, 100) as u8,
    })
}

/// Rows per INSERT statement; three binds per row keeps each statement
/// well under the Postgres limit of 65535 bind parameters
const INSERT_CHUNK_ROWS: usize = 5000;

/// Build a bulk INSERT for the given matches
fn insert_query(matches: &[PropertyMatch]) -> QueryBuilder<'_, Postgres> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO property_matches (user_id, property_id, match_score) ");

    builder.push_values(matches, |mut row, m| {
        row.push_bind(&m.user_id)
            .push_bind(&m.property_id)
            .push_bind(i16::from(m.match_score));
    });

    builder
}

#[async_trait]
impl MatchRepository for PostgresClient {
    async fn fetch_preferences(&self, user_id: &str) -> Result<UserPreferenceProfile, RepositoryError> {
        let query = r#"
            SELECT user_id, budget, location, property_preference_types, bedrooms, bathrooms
            FROM user_preferences
            WHERE user_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Preferences not found for user {}", user_id)))?;

        Ok(preferences_from_row(&row)?)
    }

    async fn fetch_properties_by_status(&self, status: &str) -> Result<Vec<Property>, RepositoryError> {
        let query = r#"
            SELECT id, title, price, location, type, bedrooms, bathrooms, status
            FROM properties
            WHERE status = $1
            ORDER BY created_at, id
        "#;

        let rows = sqlx::query(query).bind(status).fetch_all(&self.pool).await?;
        let properties = rows
            .iter()
            .map(property_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Fetched {} properties with status {}", properties.len(), status);

        Ok(properties)
    }

    async fn fetch_user_ids(&self) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query("SELECT id FROM profiles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("id")).collect())
    }

    async fn delete_matches(&self, user_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM property_matches WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Deleted {} matches for user {}", result.rows_affected(), user_id);
        Ok(())
    }

    async fn insert_matches(&self, matches: &[PropertyMatch]) -> Result<(), RepositoryError> {
        if matches.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for chunk in matches.chunks(INSERT_CHUNK_ROWS) {
            insert_query(chunk).build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn fetch_matches(&self, user_id: &str) -> Result<Vec<PropertyMatch>, RepositoryError> {
        let query = r#"
            SELECT user_id, property_id, match_score
            FROM property_matches
            WHERE user_id = $1
            ORDER BY match_score DESC, created_at
        "#;

        let rows = sqlx::query(query).bind(user_id).fetch_all(&self.pool).await?;
        let matches = rows
            .iter()
            .map(match_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(matches)
    }

    async fn replace_matches(
        &self,
        user_id: &str,
        matches: &[PropertyMatch],
    ) -> Result<(), RepositoryError> {
        if let Some(other) = matches.iter().find(|m| m.user_id != user_id) {
            return Err(PostgresError::InvalidInput(format!(
                "match for user {} in batch for user {}",
                other.user_id, user_id
            ))
            .into());
        }

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM property_matches WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for chunk in matches.chunks(INSERT_CHUNK_ROWS) {
            insert_query(chunk).build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            "Replaced {} matches with {} for user {}",
            deleted.rows_affected(),
            matches.len(),
            user_id
        );

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }
}
