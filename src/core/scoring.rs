use crate::models::{Budget, Property, ScoreBreakdown, UserPreferenceProfile};
use crate::core::filters::matches_property_type;

pub const PRICE_WEIGHT: f64 = 30.0;
pub const LOCATION_WEIGHT: f64 = 25.0;
pub const PROPERTY_TYPE_WEIGHT: f64 = 20.0;
pub const BEDROOMS_WEIGHT: f64 = 15.0;
pub const BATHROOMS_WEIGHT: f64 = 10.0;

/// Partial location credit when only the city token matches
pub const CITY_MATCH_POINTS: f64 = 15.0;

/// Extra multiplier applied when a property is over budget
pub const OVER_BUDGET_PENALTY: f64 = 0.7;

/// Calculate a match score (0-100) for a property based on user preferences
///
/// Scoring formula:
/// score = round(awarded / applicable_weight * 100)
///
/// where each factor contributes only if the matching preference is set:
///     price          30   # Within budget = full, decays outside it
///     location       25   # Substring either way = full, city token = 15
///     property type  20   # Type is in the expanded intent set
///     bedrooms       15   # Exact = 15, off by one = 10, off by two = 5
///     bathrooms      10   # Exact = 10, off by one = 7, off by two = 3
///
/// A profile with no preferences set scores 0.
pub fn calculate_score(preferences: &UserPreferenceProfile, property: &Property) -> u8 {
    score_breakdown(preferences, property).score()
}

/// Points awarded per factor, plus the total applicable weight
pub fn score_breakdown(preferences: &UserPreferenceProfile, property: &Property) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::default();

    if let Some(budget) = preferences.budget {
        breakdown.price = Some(price_points(&budget, property.price));
        breakdown.total_weight += PRICE_WEIGHT;
    }

    if let Some(location) = preferences.location() {
        breakdown.location = Some(location_points(location, &property.location));
        breakdown.total_weight += LOCATION_WEIGHT;
    }

    if !preferences.property_preference_types.is_empty() {
        let points = if matches_property_type(property, preferences) {
            PROPERTY_TYPE_WEIGHT
        } else {
            0.0
        };
        breakdown.property_type = Some(points);
        breakdown.total_weight += PROPERTY_TYPE_WEIGHT;
    }

    if let Some(wanted) = preferences.bedrooms {
        breakdown.bedrooms = Some(bedroom_points(wanted, property.bedrooms));
        breakdown.total_weight += BEDROOMS_WEIGHT;
    }

    if let Some(wanted) = preferences.bathrooms {
        breakdown.bathrooms = Some(bathroom_points(wanted, property.bathrooms));
        breakdown.total_weight += BATHROOMS_WEIGHT;
    }

    breakdown
}

/// Price points (0-30)
///
/// Inside the budget the full weight is awarded. Below `min` the reward
/// shrinks linearly with the relative distance to `min`; above `max` it
/// shrinks the same way and is then multiplied by the over-budget penalty.
/// A non-positive bound on the side being decayed awards nothing.
#[inline]
pub fn price_points(budget: &Budget, price: f64) -> f64 {
    if price >= budget.min && price <= budget.max {
        return PRICE_WEIGHT;
    }

    if price < budget.min {
        if budget.min <= 0.0 {
            return 0.0;
        }
        let ratio = 1.0 - (budget.min - price) / budget.min;
        return PRICE_WEIGHT * ratio.max(0.0);
    }

    if price > budget.max {
        if budget.max <= 0.0 {
            return 0.0;
        }
        let ratio = 1.0 - (price - budget.max) / budget.max;
        return PRICE_WEIGHT * ratio.max(0.0) * OVER_BUDGET_PENALTY;
    }

    // NaN price
    0.0
}

/// Location points (0, 15 or 25)
///
/// Only the city token (text before the first comma) is checked against the
/// property location for partial credit, never the reverse.
#[inline]
pub fn location_points(preferred: &str, property_location: &str) -> f64 {
    let preferred = preferred.trim().to_lowercase();
    let actual = property_location.trim().to_lowercase();

    if preferred.is_empty() || actual.is_empty() {
        return 0.0;
    }

    if actual.contains(&preferred) || preferred.contains(&actual) {
        return LOCATION_WEIGHT;
    }

    let city = city_token(&preferred);
    if !city.is_empty() && actual.contains(city) {
        return CITY_MATCH_POINTS;
    }

    0.0
}

/// Text before the first comma, trimmed
#[inline]
fn city_token(location: &str) -> &str {
    location.split(',').next().unwrap_or_default().trim()
}

/// Bedroom points (0-15)
#[inline]
pub fn bedroom_points(wanted: i32, actual: Option<i32>) -> f64 {
    match actual.map(|a| (i64::from(a) - i64::from(wanted)).abs()) {
        Some(0) => BEDROOMS_WEIGHT,
        Some(1) => 10.0,
        Some(2) => 5.0,
        _ => 0.0,
    }
}

/// Bathroom points (0-10)
#[inline]
pub fn bathroom_points(wanted: i32, actual: Option<i32>) -> f64 {
    match actual.map(|a| (i64::from(a) - i64::from(wanted)).abs()) {
        Some(0) => BATHROOMS_WEIGHT,
        Some(1) => 7.0,
        Some(2) => 3.0,
        _ => 0.0,
    }
}
