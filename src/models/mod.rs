// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Budget, Property, PropertyMatch, ScoreBreakdown, UserPreferenceProfile, STATUS_AVAILABLE};
pub use requests::{GenerateMatchesRequest, ScoreRequest, StoredMatchesQuery};
pub use responses::{ErrorResponse, GenerateMatchesResponse, HealthResponse, RegenerateResponse, ScoreResponse, StoredMatchesResponse};
