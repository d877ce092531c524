// Service exports
pub mod cache;
pub mod matching;
pub mod policy;
pub mod postgres;
pub mod repository;
pub mod supabase;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use matching::MatchService;
pub use policy::RequestPolicy;
pub use postgres::{PostgresClient, PostgresError};
pub use repository::{MatchRepository, RepositoryError};
pub use supabase::{SupabaseClient, SupabaseError, SupabaseTables};
