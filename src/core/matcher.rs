use crate::models::{Property, PropertyMatch, UserPreferenceProfile};
use crate::core::{filters::is_candidate, scoring::calculate_score};

/// Minimum score a match needs to be kept
pub const DEFAULT_MIN_SCORE: u8 = 40;

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<PropertyMatch>,
    pub total_candidates: usize,
}

/// Ranks a pool of properties against one user's preferences
///
/// # Pipeline Stages
/// 1. Availability filter
/// 2. Scoring
/// 3. Threshold filter
/// 4. Stable descending sort (ties keep fetch order)
#[derive(Debug, Clone)]
pub struct Matcher {
    min_score: u8,
}

impl Matcher {
    pub fn new(min_score: u8) -> Self {
        Self { min_score }
    }

    pub fn min_score(&self) -> u8 {
        self.min_score
    }

    /// Score and rank `properties` for `user_id`
    ///
    /// # Arguments
    /// * `user_id` - Owner of the generated matches
    /// * `preferences` - The user's stored preference profile
    /// * `properties` - Candidate properties, in fetch order
    ///
    /// # Returns
    /// MatchResult with every match at or above the threshold, best first
    pub fn rank(
        &self,
        user_id: &str,
        preferences: &UserPreferenceProfile,
        properties: &[Property],
    ) -> MatchResult {
        let total_candidates = properties.len();

        let mut matches: Vec<PropertyMatch> = properties
            .iter()
            .filter(|property| is_candidate(property))
            .filter_map(|property| {
                let score = calculate_score(preferences, property);

                if score >= self.min_score {
                    Some(PropertyMatch {
                        user_id: user_id.to_string(),
                        property_id: property.id.clone(),
                        match_score: score,
                    })
                } else {
                    None
                }
            })
            .collect();

        // sort_by is stable
        matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));

        MatchResult {
            matches,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Budget;

    fn create_property(id: &str, price: f64, bedrooms: i32) -> Property {
        Property {
            id: id.to_string(),
            title: None,
            price,
            location: "Downtown Dubai".to_string(),
            property_type: "apartment".to_string(),
            bedrooms: Some(bedrooms),
            bathrooms: Some(1),
            status: "available".to_string(),
        }
    }

    fn create_preferences() -> UserPreferenceProfile {
        UserPreferenceProfile {
            user_id: "current_user".to_string(),
            budget: Some(Budget { min: 1000.0, max: 2000.0 }),
            location: None,
            property_preference_types: vec![],
            bedrooms: Some(2),
            bathrooms: None,
        }
    }

    #[test]
    fn test_rank_filters_below_threshold() {
        let matcher = Matcher::default();
        let preferences = create_preferences();

        let properties = vec![
            create_property("1", 1500.0, 2), // 100
            create_property("2", 9000.0, 9), // 0
        ];

        let result = matcher.rank("current_user", &preferences, &properties);

        assert_eq!(result.total_candidates, 2);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].property_id, "1");
        assert_eq!(result.matches[0].match_score, 100);
        assert_eq!(result.matches[0].user_id, "current_user");
    }

    #[test]
    fn test_rank_sorted_descending_with_stable_ties() {
        let matcher = Matcher::default();
        let preferences = create_preferences();

        let properties = vec![
            create_property("a", 1500.0, 3), // 30 + 10 -> 89
            create_property("b", 1500.0, 2), // 100
            create_property("c", 1500.0, 1), // 89
            create_property("d", 1200.0, 2), // 100
        ];

        let result = matcher.rank("current_user", &preferences, &properties);
        let ids: Vec<&str> = result.matches.iter().map(|m| m.property_id.as_str()).collect();

        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_rank_skips_unavailable() {
        let matcher = Matcher::default();
        let preferences = create_preferences();

        let mut sold = create_property("sold", 1500.0, 2);
        sold.status = "sold".to_string();

        let result = matcher.rank("current_user", &preferences, &[sold]);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // bedrooms off by one alone: 10 / 15 -> 67; with a threshold of 67 it stays
        let preferences = UserPreferenceProfile {
            bedrooms: Some(3),
            ..Default::default()
        };
        let properties = vec![create_property("1", 1500.0, 2)];

        assert_eq!(Matcher::new(67).rank("u", &preferences, &properties).matches.len(), 1);
        assert!(Matcher::new(68).rank("u", &preferences, &properties).matches.is_empty());
    }
}
