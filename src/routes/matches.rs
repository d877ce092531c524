use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use std::time::Instant;
use validator::Validate;
use crate::core::score_breakdown;
use crate::models::{
    ErrorResponse, GenerateMatchesRequest, GenerateMatchesResponse, HealthResponse,
    RegenerateResponse, ScoreRequest, ScoreResponse, StoredMatchesQuery, StoredMatchesResponse,
};
use crate::services::{CacheManager, MatchService};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: MatchService,
    pub cache: Option<Arc<CacheManager>>,
}

impl AppState {
    /// Drop one user's cached matches
    pub async fn invalidate_user(&self, user_id: &str) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate_user(user_id).await {
                tracing::warn!("Failed to invalidate cache for {}: {}", user_id, e);
            }
        }
    }

    /// Drop every user's cached matches
    pub async fn invalidate_all(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate_all().await {
                tracing::warn!("Failed to invalidate match cache: {}", e);
            }
        }
    }

    /// Run the batch job and clear the read cache afterwards
    pub async fn regenerate_all(&self) -> usize {
        let processed = self.service.regenerate_all_matches().await;
        self.invalidate_all().await;
        processed
    }
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches", web::get().to(stored_matches))
        .route("/matches/generate", web::post().to(generate_matches))
        .route("/matches/regenerate", web::post().to(regenerate_matches))
        .route("/matches/score", web::post().to(score_property));
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = state.service.repository().health_check().await;
    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Generate matches for one user
///
/// POST /api/v1/matches/generate
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "persist": true
/// }
/// ```
async fn generate_matches(
    state: web::Data<AppState>,
    req: web::Json<GenerateMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for generate request: {:?}", errors);
        return validation_error(errors);
    }

    let user_id = &req.user_id;
    tracing::info!("Generating matches for user: {}", user_id);

    let matches = state.service.generate_matches_for_user(user_id).await;

    let persisted = if req.persist {
        let ok = state.service.persist_matches(&matches).await;
        if ok {
            state.invalidate_user(user_id).await;
        }
        Some(ok)
    } else {
        None
    };

    tracing::info!(
        "Returning {} matches for user {} (persisted: {:?})",
        matches.len(),
        user_id,
        persisted
    );

    HttpResponse::Ok().json(GenerateMatchesResponse {
        user_id: user_id.clone(),
        matches,
        persisted,
    })
}

/// Regenerate matches for every user
///
/// POST /api/v1/matches/regenerate
async fn regenerate_matches(state: web::Data<AppState>) -> impl Responder {
    let started = Instant::now();
    let processed_users = state.regenerate_all().await;

    HttpResponse::Ok().json(RegenerateResponse {
        processed_users,
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}

/// Stored matches for a user
///
/// GET /api/v1/matches?userId={userId}
async fn stored_matches(
    state: web::Data<AppState>,
    query: web::Query<StoredMatchesQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let user_id = &query.user_id;

    if let Some(cache) = &state.cache {
        match cache.get_matches(user_id).await {
            Ok(Some(matches)) => {
                return HttpResponse::Ok().json(StoredMatchesResponse {
                    user_id: user_id.clone(),
                    count: matches.len(),
                    matches,
                });
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Match cache read failed for {}: {}", user_id, e),
        }
    }

    let repo = state.service.repository();
    let result = state
        .service
        .policy()
        .run("fetch matches", || repo.fetch_matches(user_id))
        .await;

    match result {
        Ok(matches) => {
            if let Some(cache) = &state.cache {
                if let Err(e) = cache.set_matches(user_id, &matches).await {
                    tracing::warn!("Failed to cache matches for {}: {}", user_id, e);
                }
            }

            HttpResponse::Ok().json(StoredMatchesResponse {
                user_id: user_id.clone(),
                count: matches.len(),
                matches,
            })
        }
        Err(e) => {
            tracing::error!("Failed to fetch stored matches for {}: {}", user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch matches".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Score one preference/property pair and explain it
///
/// POST /api/v1/matches/score
async fn score_property(req: web::Json<ScoreRequest>) -> impl Responder {
    let breakdown = score_breakdown(&req.preferences, &req.property);

    HttpResponse::Ok().json(ScoreResponse {
        score: breakdown.score(),
        breakdown,
    })
}
