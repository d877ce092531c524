// HTTP API tests for Estate Match

mod common;

use actix_web::{test, web, App};
use common::{create_preferences, seed_market, InMemoryRepository};
use estate_match::core::Matcher;
use estate_match::models::{
    GenerateMatchesResponse, RegenerateResponse, ScoreResponse, StoredMatchesResponse,
};
use estate_match::routes::{configure_routes, AppState};
use estate_match::services::{MatchService, RequestPolicy};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn create_state(repo: &Arc<InMemoryRepository>) -> AppState {
    AppState {
        service: MatchService::new(
            repo.clone(),
            Matcher::default(),
            RequestPolicy::no_retry(Duration::from_secs(1)),
        ),
        cache: None,
    }
}

#[actix_web::test]
async fn test_generate_endpoint_persists() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.add_user(create_preferences("alice"));
    seed_market(&repo);

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&repo)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "alice" }))
        .to_request();
    let resp: GenerateMatchesResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.user_id, "alice");
    assert_eq!(resp.matches.len(), 4);
    assert_eq!(resp.persisted, Some(true));
    assert_eq!(repo.stored("alice"), resp.matches);
}

#[actix_web::test]
async fn test_generate_endpoint_dry_run() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.add_user(create_preferences("alice"));
    seed_market(&repo);

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&repo)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "alice", "persist": false }))
        .to_request();
    let resp: GenerateMatchesResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.persisted, None);
    assert!(repo.stored("alice").is_empty());
}

#[actix_web::test]
async fn test_generate_endpoint_rejects_empty_user() {
    let repo = Arc::new(InMemoryRepository::new());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&repo)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_regenerate_then_read_stored() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.add_user(create_preferences("alice"));
    repo.add_user(create_preferences("bob"));
    seed_market(&repo);

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&repo)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/regenerate")
        .to_request();
    let resp: RegenerateResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp.processed_users, 2);

    let req = test::TestRequest::get()
        .uri("/api/v1/matches?userId=bob")
        .to_request();
    let resp: StoredMatchesResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.user_id, "bob");
    assert_eq!(resp.count, 4);
    assert_eq!(resp.matches[0].property_id, "perfect");
}

#[actix_web::test]
async fn test_score_endpoint_explains_factors() {
    let repo = Arc::new(InMemoryRepository::new());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&repo)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/score")
        .set_json(json!({
            "preferences": {
                "userId": "u1",
                "location": "Dubai",
                "bedrooms": 3
            },
            "property": {
                "id": "p1",
                "price": 1500.0,
                "location": "Downtown Dubai",
                "type": "villa",
                "bedrooms": 2
            }
        }))
        .to_request();
    let resp: ScoreResponse = test::call_and_read_body_json(&app, req).await;

    // (25 + 10) / 40
    assert_eq!(resp.score, 88);
    assert_eq!(resp.breakdown.location, Some(25.0));
    assert_eq!(resp.breakdown.bedrooms, Some(10.0));
    assert_eq!(resp.breakdown.price, None);
    assert_eq!(resp.breakdown.total_weight, 40.0);
}

#[actix_web::test]
async fn test_health_endpoint() {
    let repo = Arc::new(InMemoryRepository::new());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&repo)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp["status"], "healthy");
}
