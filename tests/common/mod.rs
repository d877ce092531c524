// Shared test doubles for Estate Match
#![allow(dead_code)]

use async_trait::async_trait;
use estate_match::models::{Budget, Property, PropertyMatch, UserPreferenceProfile};
use estate_match::services::{MatchRepository, RepositoryError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory repository with switchable failures and call counters
#[derive(Default)]
pub struct InMemoryRepository {
    pub preferences: Mutex<HashMap<String, UserPreferenceProfile>>,
    pub properties: Mutex<Vec<Property>>,
    pub user_ids: Mutex<Vec<String>>,
    pub matches: Mutex<HashMap<String, Vec<PropertyMatch>>>,

    pub fail_user_ids: Mutex<bool>,
    pub fail_properties: Mutex<bool>,
    pub fail_delete_for: Mutex<HashSet<String>>,
    pub fail_insert_for: Mutex<HashSet<String>>,
    pub property_delay: Mutex<Option<Duration>>,

    pub delete_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    pub property_calls: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, preferences: UserPreferenceProfile) {
        self.user_ids.lock().unwrap().push(preferences.user_id.clone());
        self.preferences
            .lock()
            .unwrap()
            .insert(preferences.user_id.clone(), preferences);
    }

    pub fn add_user_without_preferences(&self, user_id: &str) {
        self.user_ids.lock().unwrap().push(user_id.to_string());
    }

    pub fn add_property(&self, property: Property) {
        self.properties.lock().unwrap().push(property);
    }

    pub fn stored(&self, user_id: &str) -> Vec<PropertyMatch> {
        self.matches
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_stored(&self, user_id: &str, matches: Vec<PropertyMatch>) {
        self.matches.lock().unwrap().insert(user_id.to_string(), matches);
    }

    pub fn snapshot(&self) -> HashMap<String, Vec<PropertyMatch>> {
        self.matches.lock().unwrap().clone()
    }
}

#[async_trait]
impl MatchRepository for InMemoryRepository {
    async fn fetch_preferences(&self, user_id: &str) -> Result<UserPreferenceProfile, RepositoryError> {
        self.preferences
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(user_id.to_string()))
    }

    async fn fetch_properties_by_status(&self, status: &str) -> Result<Vec<Property>, RepositoryError> {
        self.property_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.property_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.fail_properties.lock().unwrap() {
            return Err(RepositoryError::Unavailable("properties offline".into()));
        }

        Ok(self
            .properties
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.status == status)
            .cloned()
            .collect())
    }

    async fn fetch_user_ids(&self) -> Result<Vec<String>, RepositoryError> {
        if *self.fail_user_ids.lock().unwrap() {
            return Err(RepositoryError::Unavailable("profiles offline".into()));
        }
        Ok(self.user_ids.lock().unwrap().clone())
    }

    async fn delete_matches(&self, user_id: &str) -> Result<(), RepositoryError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_delete_for.lock().unwrap().contains(user_id) {
            return Err(RepositoryError::Unavailable(format!("delete rejected for {}", user_id)));
        }

        self.matches.lock().unwrap().remove(user_id);
        Ok(())
    }

    async fn insert_matches(&self, matches: &[PropertyMatch]) -> Result<(), RepositoryError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(first) = matches.first() {
            if self.fail_insert_for.lock().unwrap().contains(&first.user_id) {
                return Err(RepositoryError::Unavailable(format!("insert rejected for {}", first.user_id)));
            }
        }

        let mut stored = self.matches.lock().unwrap();
        for m in matches {
            stored.entry(m.user_id.clone()).or_default().push(m.clone());
        }
        Ok(())
    }

    async fn fetch_matches(&self, user_id: &str) -> Result<Vec<PropertyMatch>, RepositoryError> {
        Ok(self.stored(user_id))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

pub fn create_property(id: &str, price: f64, location: &str, property_type: &str, bedrooms: i32) -> Property {
    Property {
        id: id.to_string(),
        title: Some(format!("Listing {}", id)),
        price,
        location: location.to_string(),
        property_type: property_type.to_string(),
        bedrooms: Some(bedrooms),
        bathrooms: Some(2),
        status: "available".to_string(),
    }
}

pub fn create_preferences(user_id: &str) -> UserPreferenceProfile {
    UserPreferenceProfile {
        user_id: user_id.to_string(),
        budget: Some(Budget { min: 1000.0, max: 2000.0 }),
        location: Some("Dubai".to_string()),
        property_preference_types: vec!["buy".to_string()],
        bedrooms: Some(2),
        bathrooms: Some(2),
    }
}

/// A small market with a spread of scores for the default preferences
pub fn seed_market(repo: &InMemoryRepository) {
    repo.add_property(create_property("perfect", 1500.0, "Downtown Dubai", "villa", 2)); // 100
    repo.add_property(create_property("office", 1500.0, "Business Bay, Dubai", "office", 2)); // 80
    repo.add_property(create_property("pricey", 2600.0, "Dubai Marina", "apartment", 3)); // 80
    repo.add_property(create_property("far", 1500.0, "Sharjah", "villa", 2)); // 75
    repo.add_property(create_property("junk", 9000.0, "Al Ain", "warehouse", 7)); // 10
    let mut sold = create_property("sold", 1500.0, "Downtown Dubai", "villa", 2);
    sold.status = "sold".to_string();
    repo.add_property(sold);
}
