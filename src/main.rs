use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use estate_match::config::{Settings, StorageBackend};
use estate_match::core::Matcher;
use estate_match::routes::{self, AppState};
use estate_match::services::{
    CacheManager, MatchRepository, MatchService, PostgresClient, SupabaseClient, SupabaseTables,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn io_error(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

/// Initialize tracing from `RUST_LOG`, falling back to the configured level
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

async fn build_repository(settings: &Settings) -> Result<Arc<dyn MatchRepository>, std::io::Error> {
    match settings.storage.backend {
        StorageBackend::Supabase => {
            let tables = SupabaseTables {
                user_preferences: settings.supabase.tables.user_preferences.clone(),
                properties: settings.supabase.tables.properties.clone(),
                profiles: settings.supabase.tables.profiles.clone(),
                property_matches: settings.supabase.tables.property_matches.clone(),
            };

            let client = SupabaseClient::new(
                settings.supabase.url.clone(),
                settings.supabase.service_key.clone(),
                tables,
                Duration::from_millis(settings.matching.request_timeout_ms),
            )
            .map_err(|e| io_error(format!("Supabase client error: {}", e)))?;

            info!("Supabase client initialized");
            Ok(Arc::new(client))
        }
        StorageBackend::Postgres => {
            let client = PostgresClient::from_settings(
                &settings.database.url,
                settings.database.max_connections,
                settings.database.min_connections,
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await
            .map_err(|e| io_error(format!("PostgreSQL connection error: {}", e)))?;

            info!(
                "PostgreSQL client initialized (max: {} connections)",
                settings.database.max_connections.unwrap_or(10)
            );
            Ok(Arc::new(client))
        }
    }
}

async fn build_cache(settings: &Settings) -> Option<Arc<CacheManager>> {
    if !settings.cache.enabled {
        info!("Match cache disabled");
        return None;
    }

    let ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_size = settings.cache.l1_cache_size.unwrap_or(1000);

    match CacheManager::new(&settings.cache.redis_url, l1_size, ttl).await {
        Ok(cache) => {
            info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_size, ttl);
            Some(Arc::new(cache))
        }
        Err(e) => {
            warn!("Failed to connect to Redis ({}), running without cache", e);
            None
        }
    }
}

/// Run the batch job on a fixed interval; each run finishes before the next tick
fn spawn_periodic_regeneration(state: AppState, every: Duration) {
    actix_web::rt::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick fires immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let processed = state.regenerate_all().await;
            info!("Scheduled regeneration processed {} users", processed);
        }
    });
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(io_error(format!("Configuration error: {}", e)));
        }
    };

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());
    init_logging(&settings.logging.level, &log_format);

    info!("Starting Estate Match service...");

    let repository = build_repository(&settings).await.map_err(|e| {
        error!("Failed to initialize storage backend: {}", e);
        e
    })?;

    let cache = build_cache(&settings).await;

    let matcher = Matcher::new(settings.matching.min_score);
    let policy = settings.matching.request_policy();

    info!("Matcher initialized (min score: {}, policy: {:?})", matcher.min_score(), policy);

    let app_state = AppState {
        service: MatchService::new(repository, matcher, policy),
        cache,
    };

    if let Some(secs) = settings.matching.regenerate_interval_secs.filter(|s| *s > 0) {
        info!("Scheduling match regeneration every {}s", secs);
        spawn_periodic_regeneration(app_state.clone(), Duration::from_secs(secs));
    }

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
