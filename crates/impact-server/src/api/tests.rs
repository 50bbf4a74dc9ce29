use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::{api, config::Config, config::LogFormat, persistence, state::AppState};

fn test_config() -> Config {
    Config {
        server_port: 0,
        database_path: std::env::temp_dir()
            .join(format!("impact-test-{}.db", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .to_string(),
        database_max_connections: 1,
        admin_token: "test-admin-token".to_string(),
        seed_reference: true,
        generate_samples: false,
        during_end: None,
        rate_limit_enabled: false,
        rate_limit_rps: 20,
        trust_proxy: false,
        log_format: LogFormat::Pretty,
    }
}

async fn setup_with(config: Config) -> (Router, Arc<AppState>) {
    let db = persistence::init_database(&config.database_path, config.database_max_connections)
        .await
        .expect("init db");
    let state = Arc::new(AppState::with_database(db, config));
    state.load_from_database().await.expect("load db");
    (api::app(state.clone()), state)
}

async fn setup_app() -> (Router, Arc<AppState>) {
    setup_with(test_config()).await
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn zone_body(name: &str) -> Value {
    json!({
        "id": "ignored",
        "name": name,
        "severity": 2,
        "start_time": "2022-03-01T00:00:00Z",
        "end_time": null,
        "polygon": [[10.0, 40.0], [12.0, 40.0], [12.0, 38.0], [10.0, 38.0], [10.0, 40.0]],
        "description": "Test closure"
    })
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _state) = setup_app().await;
    let res = get(&app, "/health").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn reference_route_comparison() {
    let (app, _state) = setup_app().await;
    let res = get(&app, "/v1/routes/compare?origin=FRA&destination=LHR").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(
        body,
        json!({
            "baselineDistance": 658,
            "duringDistance": 658,
            "detourKm": 0,
            "baselineTime": 95,
            "duringTime": 95,
            "extraFuel": 0,
            "co2Impact": 0.0
        })
    );
}

#[tokio::test]
async fn reference_route_by_post_body() {
    let (app, _state) = setup_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/v1/routes/compare")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "origin": "vie", "destination": " ist " }).to_string()))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["detourKm"], 232);
    assert_eq!(body["extraFuel"], 1624);
    assert_eq!(body["co2Impact"], 5.1);
}

#[tokio::test]
async fn comparison_requires_both_codes() {
    let (app, _state) = setup_app().await;
    let res = get(&app, "/v1/routes/compare?origin=FRA").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert_eq!(body["error"], "Origin and destination are required");
}

#[tokio::test]
async fn unknown_airport_is_not_found() {
    let (app, _state) = setup_app().await;
    let res = get(&app, "/v1/routes/compare?origin=FRA&destination=XXX").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = read_json(res).await;
    assert_eq!(body["error"], "Airport XXX not found");
}

#[tokio::test]
async fn estimated_comparison_is_stored_once() {
    let (app, state) = setup_app().await;

    let first = read_json(get(&app, "/v1/routes/compare?origin=otp&destination=kbp").await).await;
    let detour = first["detourKm"].as_u64().expect("detour");
    assert!((150..350).contains(&detour), "detour {}", detour);
    assert_eq!(first["extraFuel"].as_u64(), Some(detour * 7));

    let second = read_json(get(&app, "/v1/routes/compare?origin=OTP&destination=KBP").await).await;
    assert_eq!(first, second);

    let pool = state.pool().expect("pool");
    let (rows,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM route_statistics WHERE origin_iata = 'OTP' AND destination_iata = 'KBP'",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    assert_eq!(rows, 2);
}

#[tokio::test]
async fn conflicts_follow_the_period() {
    let (app, _state) = setup_app().await;

    let baseline = read_json(get(&app, "/v1/conflicts?period=baseline").await).await;
    assert_eq!(baseline["type"], "FeatureCollection");
    assert_eq!(baseline["features"], json!([]));

    let during = read_json(get(&app, "/v1/conflicts?period=during").await).await;
    let features = during["features"].as_array().expect("features");
    assert_eq!(features.len(), 2);
    assert!(features
        .iter()
        .any(|f| f["properties"]["severity"] == 3 && f["geometry"]["type"] == "Polygon"));
}

#[tokio::test]
async fn unknown_period_is_rejected() {
    let (app, _state) = setup_app().await;
    let res = get(&app, "/v1/stats?period=2023").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cold_stats_serve_reference_summary() {
    let (app, _state) = setup_app().await;

    let during = read_json(get(&app, "/v1/stats?period=during").await).await;
    assert_eq!(during["totalFlights"], 41289);
    assert_eq!(during["avgDetour"], 187);
    assert_eq!(during["affectedRoutes"], 78);
    let top = during["topAffectedRoutes"].as_array().expect("top routes");
    assert_eq!(top.len(), 3);
    assert_eq!(top[0], json!({ "route": "IST → FRA", "detour": 309, "impact": "High" }));

    let baseline = read_json(get(&app, "/v1/stats").await).await;
    assert_eq!(baseline["totalFlights"], 45623);
    assert!(baseline.get("topAffectedRoutes").is_none());
}

#[tokio::test]
async fn stats_seed_samples_on_first_request() {
    let mut config = test_config();
    config.generate_samples = true;
    let (app, _state) = setup_with(config).await;

    let first = read_json(get(&app, "/v1/stats?period=during").await).await;
    assert_eq!(first["totalFlights"], 41289);

    let second = read_json(get(&app, "/v1/stats?period=during").await).await;
    let flights = second["totalFlights"].as_u64().expect("flights");
    assert!((60..=174).contains(&flights), "flights {}", flights);
    let top = second["topAffectedRoutes"].as_array().expect("top routes");
    assert!(top.len() <= 3);
}

#[tokio::test]
async fn heatmap_is_generated_then_served_from_store() {
    let (app, _state) = setup_app().await;

    let first = read_json(get(&app, "/v1/heatmap?period=during").await).await;
    let generated = first["features"].as_array().expect("features").len();
    assert_eq!(generated, 270);
    let props = &first["features"][0]["properties"];
    assert!(props["intensity"].as_f64().is_some());
    assert!(props["flightCount"].as_u64().is_some());
    assert!(props["avgDetour"].as_u64().is_some());

    let second = read_json(get(&app, "/v1/heatmap?period=during").await).await;
    let stored = second["features"].as_array().expect("features").len();
    assert!(stored > 0 && stored <= generated);

    let third = read_json(get(&app, "/v1/heatmap?period=during").await).await;
    assert_eq!(third, second);
}

#[tokio::test]
async fn airport_directory() {
    let (app, _state) = setup_app().await;

    let list = read_json(get(&app, "/v1/airports").await).await;
    let codes: Vec<&str> = list
        .as_array()
        .expect("airports")
        .iter()
        .filter_map(|a| a["iata"].as_str())
        .collect();
    assert_eq!(codes.len(), 18);
    assert_eq!(codes.first(), Some(&"AMM"));
    assert!(codes.windows(2).all(|w| w[0] < w[1]));

    let fra = read_json(get(&app, "/v1/airports/fra").await).await;
    assert_eq!(fra["city"], "Frankfurt");

    let res = get(&app, "/v1/airports/XXX").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn zone_admin_requires_token() {
    let (app, _state) = setup_app().await;

    let unauthenticated = Request::builder()
        .method("PUT")
        .uri("/v1/admin/zones/3")
        .header("content-type", "application/json")
        .body(Body::from(zone_body("Test").to_string()))
        .unwrap();
    let res = app.clone().oneshot(unauthenticated).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let wrong_token = Request::builder()
        .method("DELETE")
        .uri("/v1/admin/zones/1")
        .header("authorization", "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(wrong_token).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn zone_admin_lifecycle() {
    let (app, state) = setup_app().await;

    let put = Request::builder()
        .method("PUT")
        .uri("/v1/admin/zones/3")
        .header("content-type", "application/json")
        .header("authorization", "Bearer test-admin-token")
        .body(Body::from(zone_body("Central Med Closure").to_string()))
        .unwrap();
    let res = app.clone().oneshot(put).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(read_json(res).await["id"], "3");
    assert!(state.get_zone("3").is_some());

    let during = read_json(get(&app, "/v1/conflicts?period=during").await).await;
    assert_eq!(during["features"].as_array().map(Vec::len), Some(3));

    let mut invalid = zone_body("Backwards");
    invalid["end_time"] = json!("2021-01-01T00:00:00Z");
    let bad = Request::builder()
        .method("PUT")
        .uri("/v1/admin/zones/4")
        .header("content-type", "application/json")
        .header("authorization", "Bearer test-admin-token")
        .body(Body::from(invalid.to_string()))
        .unwrap();
    let res = app.clone().oneshot(bad).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert_eq!(body["details"].as_array().map(Vec::len), Some(1));

    let delete = |id: &str| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/v1/admin/zones/{}", id))
            .header("authorization", "Bearer test-admin-token")
            .body(Body::empty())
            .unwrap()
    };
    let res = app.clone().oneshot(delete("3")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = app.clone().oneshot(delete("3")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn state_without_store_uses_reference_data() {
    let state = Arc::new(AppState::new(test_config()));
    let app = api::app(state);

    let stats = read_json(get(&app, "/v1/stats?period=during").await).await;
    assert_eq!(stats["totalFlights"], 41289);

    let heatmap = read_json(get(&app, "/v1/heatmap?period=baseline").await).await;
    assert_eq!(heatmap["features"].as_array().map(Vec::len), Some(270));

    let res = get(&app, "/v1/routes/compare?origin=TLV&destination=AMM").await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_cold_stats_seed_a_single_fleet() {
    let mut config = test_config();
    config.generate_samples = true;
    config.database_max_connections = 4;
    let (app, state) = setup_with(config).await;

    let (first, second) = tokio::join!(
        get(&app, "/v1/stats?period=during"),
        get(&app, "/v1/stats?period=during")
    );
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);

    let pool = state.pool().expect("pool");
    let (tracks,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM flight_tracks WHERE period = 'during'")
            .fetch_one(pool)
            .await
            .unwrap();
    let (route_flights,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(total_flights), 0) FROM route_statistics WHERE period = 'during'",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    assert!(tracks > 0);
    assert_eq!(tracks, route_flights);

    let summary = read_json(get(&app, "/v1/stats?period=during").await).await;
    assert_eq!(summary["totalFlights"], tracks);
}

#[tokio::test]
async fn closed_store_falls_back_on_read_paths() {
    let (app, state) = setup_app().await;
    state.pool().expect("pool").close().await;

    let stats = get(&app, "/v1/stats?period=during").await;
    assert_eq!(stats.status(), StatusCode::OK);
    let stats = read_json(stats).await;
    assert_eq!(stats["totalFlights"], 41289);
    assert_eq!(stats["affectedRoutes"], 78);

    let heatmap = get(&app, "/v1/heatmap?period=during").await;
    assert_eq!(heatmap.status(), StatusCode::OK);
    let heatmap = read_json(heatmap).await;
    assert_eq!(heatmap["features"].as_array().map(Vec::len), Some(270));

    let compare = get(&app, "/v1/routes/compare?origin=OTP&destination=KBP").await;
    assert_eq!(compare.status(), StatusCode::OK);
    let detour = read_json(compare).await["detourKm"].as_u64().expect("detour");
    assert!((150..350).contains(&detour), "detour {}", detour);
}

#[tokio::test]
async fn malformed_json_bodies_get_json_errors() {
    let (app, _state) = setup_app().await;

    let compare = Request::builder()
        .method("POST")
        .uri("/v1/routes/compare")
        .header("content-type", "application/json")
        .body(Body::from("{\"origin\": \"FRA\""))
        .unwrap();
    let res = app.clone().oneshot(compare).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));

    let mut zone = zone_body("Bad severity");
    zone["severity"] = json!("high");
    let put = Request::builder()
        .method("PUT")
        .uri("/v1/admin/zones/5")
        .header("content-type", "application/json")
        .header("authorization", "Bearer test-admin-token")
        .body(Body::from(zone.to_string()))
        .unwrap();
    let res = app.clone().oneshot(put).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(res).await;
    assert!(body["error"].is_string());
}
