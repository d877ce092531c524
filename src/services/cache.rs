use crate::models::PropertyMatch;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Read-through cache of each user's stored matches
///
/// Local moka entries sit in front of Redis, which is shared across
/// instances. Entries are written on a read miss and dropped whenever the
/// user's matches are replaced.
pub struct CacheManager {
    redis: Arc<Mutex<ConnectionManager>>,
    local: moka::future::Cache<String, Arc<Vec<PropertyMatch>>>,
    ttl_secs: u64,
}

impl CacheManager {
    pub async fn new(redis_url: &str, local_capacity: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        let local = moka::future::CacheBuilder::new(local_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(Mutex::new(redis)),
            local,
            ttl_secs,
        })
    }

    /// Cached matches for a user, `None` on a miss
    pub async fn get_matches(&self, user_id: &str) -> Result<Option<Vec<PropertyMatch>>, CacheError> {
        let key = CacheKey::matches(user_id);

        if let Some(matches) = self.local.get(&key).await {
            tracing::trace!("Local match cache hit for {}", user_id);
            return Ok(Some(matches.as_ref().clone()));
        }

        let stored: Option<String> = {
            let mut conn = self.redis.lock().await;
            redis::cmd("GET").arg(&key).query_async(&mut *conn).await?
        };

        let Some(json) = stored else {
            tracing::trace!("Match cache miss for {}", user_id);
            return Ok(None);
        };

        let matches: Vec<PropertyMatch> = serde_json::from_str(&json)?;
        self.local.insert(key, Arc::new(matches.clone())).await;

        Ok(Some(matches))
    }

    pub async fn set_matches(&self, user_id: &str, matches: &[PropertyMatch]) -> Result<(), CacheError> {
        let key = CacheKey::matches(user_id);
        let json = serde_json::to_string(matches)?;

        self.local.insert(key.clone(), Arc::new(matches.to_vec())).await;

        let mut conn = self.redis.lock().await;
        let _: () = redis::cmd("SETEX")
            .arg(&key)
            .arg(self.ttl_secs)
            .arg(json)
            .query_async(&mut *conn)
            .await?;

        Ok(())
    }

    pub async fn invalidate_user(&self, user_id: &str) -> Result<(), CacheError> {
        let key = CacheKey::matches(user_id);
        self.local.invalidate(&key).await;

        let mut conn = self.redis.lock().await;
        let _: () = redis::cmd("DEL").arg(&key).query_async(&mut *conn).await?;
        Ok(())
    }

    /// Drop every user's cached matches after a batch run
    pub async fn invalidate_all(&self) -> Result<(), CacheError> {
        self.local.invalidate_all();

        let mut conn = self.redis.lock().await;
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(CacheKey::ALL_MATCHES)
            .query_async(&mut *conn)
            .await?;

        if !keys.is_empty() {
            let _: () = redis::cmd("DEL").arg(&keys).query_async(&mut *conn).await?;
        }

        tracing::debug!("Invalidated {} cached match lists", keys.len());
        Ok(())
    }
}

pub struct CacheKey;

impl CacheKey {
    /// Redis pattern covering every user's entry
    pub const ALL_MATCHES: &'static str = "matches:*";

    pub fn matches(user_id: &str) -> String {
        format!("matches:{}", user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_matches_round_trip_and_invalidate() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 100, 60)
            .await
            .expect("Failed to create cache");

        let matches = vec![PropertyMatch {
            user_id: "cache_test_user".to_string(),
            property_id: "p1".to_string(),
            match_score: 80,
        }];

        cache.set_matches("cache_test_user", &matches).await.unwrap();
        assert_eq!(cache.get_matches("cache_test_user").await.unwrap(), Some(matches));

        cache.invalidate_user("cache_test_user").await.unwrap();
        assert_eq!(cache.get_matches("cache_test_user").await.unwrap(), None);
    }

    #[test]
    fn test_cache_keys() {
        assert_eq!(CacheKey::matches("user123"), "matches:user123");
        assert!(CacheKey::ALL_MATCHES.starts_with("matches:"));
    }
}
