use serde::{Deserialize, Serialize};

/// Property status that makes a listing a matching candidate
pub const STATUS_AVAILABLE: &str = "available";

/// Price range a user is willing to pay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub min: f64,
    pub max: f64,
}

/// Stored search criteria for a single user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferenceProfile {
    #[serde(rename = "userId", alias = "user_id", default)]
    pub user_id: String,
    #[serde(default)]
    pub budget: Option<Budget>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(
        rename = "propertyPreferenceTypes",
        alias = "property_preference_types",
        default
    )]
    pub property_preference_types: Vec<String>,
    #[serde(default)]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<i32>,
}

impl UserPreferenceProfile {
    /// Preferred location, ignoring blank strings
    pub fn location(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

/// Property listing as stored by the marketplace backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", alias = "property_type", default)]
    pub property_type: String,
    #[serde(default)]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<i32>,
    #[serde(default = "default_status")]
    pub status: String,
}

impl Property {
    /// Only available listings take part in matching
    pub fn is_available(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_AVAILABLE)
    }
}

fn default_status() -> String { STATUS_AVAILABLE.to_string() }

/// Persisted (user, property, score) recommendation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyMatch {
    #[serde(rename = "userId", alias = "user_id")]
    pub user_id: String,
    #[serde(rename = "propertyId", alias = "property_id")]
    pub property_id: String,
    #[serde(rename = "matchScore", alias = "match_score")]
    pub match_score: u8,
}

/// Points awarded per factor for one preference/property pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub price: Option<f64>,
    pub location: Option<f64>,
    #[serde(rename = "propertyType")]
    pub property_type: Option<f64>,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    /// Sum of the weights of every factor that applied
    #[serde(rename = "totalWeight")]
    pub total_weight: f64,
}

impl ScoreBreakdown {
    /// Sum of awarded points across applicable factors
    pub fn awarded(&self) -> f64 {
        [
            self.price,
            self.location,
            self.property_type,
            self.bedrooms,
            self.bathrooms,
        ]
        .iter()
        .flatten()
        .sum()
    }

    /// Final 0-100 score
    pub fn score(&self) -> u8 {
        if self.total_weight <= 0.0 {
            return 0;
        }

        let pct = (self.awarded() / self.total_weight * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }
}
