use std::collections::HashSet;

use crate::models::{Property, UserPreferenceProfile};

/// Residential types acceptable for buy and rent intents
const RESIDENTIAL_TYPES: &[&str] = &["apartment", "villa", "townhouse", "penthouse", "duplex"];

/// Types acceptable for investment intent
const INVESTMENT_TYPES: &[&str] = &["apartment", "commercial", "land", "retail", "office"];

/// Concrete property types for a single preference token (`buy`, `rent`, `invest`)
///
/// Unknown tokens expand to nothing.
pub fn property_types_for(token: &str) -> &'static [&'static str] {
    match token.trim().to_ascii_lowercase().as_str() {
        "buy" | "rent" => RESIDENTIAL_TYPES,
        "invest" => INVESTMENT_TYPES,
        _ => &[],
    }
}

/// Union of the concrete types behind every preferred token
pub fn expand_preference_types(tokens: &[String]) -> HashSet<&'static str> {
    tokens
        .iter()
        .flat_map(|token| property_types_for(token).iter().copied())
        .collect()
}

/// Check whether a property's type is acceptable for the user's intents
#[inline]
pub fn matches_property_type(property: &Property, preferences: &UserPreferenceProfile) -> bool {
    let accepted = expand_preference_types(&preferences.property_preference_types);
    accepted.contains(property.property_type.trim().to_lowercase().as_str())
}

/// Check if a property can take part in matching at all
#[inline]
pub fn is_candidate(property: &Property) -> bool {
    property.is_available()
}
