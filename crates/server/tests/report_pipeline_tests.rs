//! Submission pipeline tests, driven through the HTTP surface with stand-in
//! engine commands: `echo` for a healthy engine, `false` for an abnormal
//! exit, `sleep` for a hang. All unix-only, like the commands themselves.
#![cfg(unix)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use nereus_core::AccessGate;
use nereus_server::enricher::NarrativeEnricher;
use nereus_server::predictor::{EngineConfig, SubprocessPredictor};
use nereus_server::store::{IncidentStore, MemoryStore};
use nereus_server::{build_router, AppState, SharedState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const CAUTION_ENGINE: &str = r#"{"predicted_risk_level":"Caution","risk_score":0.42}"#;

fn app_with_engine(program: &str, args: &[&str], timeout_ms: u64) -> (Router, SharedState) {
    let state = Arc::new(AppState::new(
        AccessGate::new("test_secret"),
        Arc::new(MemoryStore::new()),
        Arc::new(SubprocessPredictor::new(EngineConfig {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            env: Vec::new(),
            timeout: Duration::from_millis(timeout_ms),
        })),
        NarrativeEnricher::disabled(),
    ));
    (build_router(state.clone()), state)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"name": "Ana", "email": email, "password": "pw123456"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

fn bay_features() -> Value {
    json!({
        "tide_height": 1.2, "wind_speed": 30.0, "sea_temp": 28.5,
        "rainfall": 10.0, "mangrove_index": 0.4, "region_name": "Bay"
    })
}

#[tokio::test]
async fn test_submission_round_trips_features() {
    let (app, state) = app_with_engine("echo", &[CAUTION_ENGINE], 5_000);
    let token = register(&app, "ana@ex.com").await;

    let (status, incident) = request(
        &app,
        "POST",
        "/api/incidents/report",
        Some(&token),
        Some(bay_features()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(incident["kind"], "modelled");
    assert!(incident["id"].as_str().map(|s| !s.is_empty()).unwrap_or(false));
    assert_eq!(incident["inference"]["predicted_risk_level"], "Caution");
    assert_eq!(incident["inference"]["risk_score"], 0.42);
    assert!(incident.get("narrative").is_none());
    assert_eq!(incident["region_name"], "Bay");

    // The stored features equal the submission exactly.
    for (key, expected) in bay_features().as_object().unwrap() {
        assert_eq!(&incident["features"][key], expected, "feature {key}");
    }
    assert_eq!(state.incidents.len(), 1);
}

#[tokio::test]
async fn test_missing_mandatory_field_fails_fast() {
    let (app, state) = app_with_engine("echo", &[CAUTION_ENGINE], 5_000);
    let token = register(&app, "ana@ex.com").await;

    let mut features = bay_features();
    features.as_object_mut().unwrap().remove("mangrove_index");

    let (status, body) = request(
        &app,
        "POST",
        "/api/incidents/report",
        Some(&token),
        Some(features),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"].as_str().unwrap().contains("mangrove_index"),
        "error names the missing field: {body}"
    );
    assert_eq!(state.incidents.len(), 0, "no store mutation on rejection");
}

#[tokio::test]
async fn test_zero_readings_are_valid() {
    let (app, _state) = app_with_engine("echo", &[CAUTION_ENGINE], 5_000);
    let token = register(&app, "ana@ex.com").await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/incidents/report",
        Some(&token),
        Some(json!({
            "tide_height": 0, "wind_speed": 0, "sea_temp": 0,
            "rainfall": 0, "mangrove_index": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_engine_crash_still_persists_incident() {
    let (app, state) = app_with_engine("false", &[], 5_000);
    let token = register(&app, "ana@ex.com").await;

    let (status, incident) = request(
        &app,
        "POST",
        "/api/incidents/report",
        Some(&token),
        Some(bay_features()),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "engine failure is data, not an error");
    assert_eq!(incident["inference"]["error"], "inference_unavailable");
    assert!(incident.get("narrative").is_none());
    assert_eq!(state.incidents.len(), 1);
}

#[tokio::test]
async fn test_engine_hang_is_bounded_by_timeout() {
    let (app, state) = app_with_engine("sleep", &["30"], 150);
    let token = register(&app, "ana@ex.com").await;

    let start = std::time::Instant::now();
    let (status, incident) = request(
        &app,
        "POST",
        "/api/incidents/report",
        Some(&token),
        Some(bay_features()),
    )
    .await;

    assert!(start.elapsed() < Duration::from_secs(5), "wait must be bounded");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(incident["inference"]["error"], "inference_unavailable");
    assert!(incident["inference"]["raw"]
        .as_str()
        .unwrap()
        .contains("timeout"));
    assert_eq!(state.incidents.len(), 1);
}

#[tokio::test]
async fn test_predict_endpoint_persists_nothing() {
    let (app, state) = app_with_engine("echo", &[CAUTION_ENGINE], 5_000);

    // No token required: prediction neither mutates nor reads owned data.
    let (status, outcome) = request(&app, "POST", "/api/predict", None, Some(bay_features())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["risk_score"], 0.42);
    assert_eq!(state.incidents.len(), 0);
}

#[tokio::test]
async fn test_ai_report_unconfigured_is_unavailable() {
    let (app, _state) = app_with_engine("echo", &[CAUTION_ENGINE], 5_000);
    let (status, body) = request(
        &app,
        "POST",
        "/api/ai-report",
        None,
        Some(json!({
            "features": bay_features(),
            "predicted_risk_level": "Caution",
            "risk_score": 0.42
        })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "GEMINI_API_KEY not set");
}

#[tokio::test]
async fn test_basic_incident_path_skips_inference() {
    // Even with a hanging engine, the basic path returns immediately.
    let (app, state) = app_with_engine("sleep", &["30"], 10_000);
    let token = register(&app, "ana@ex.com").await;

    let start = std::time::Instant::now();
    let (status, incident) = request(
        &app,
        "POST",
        "/api/incidents",
        Some(&token),
        Some(json!({
            "type": "flooding",
            "description": "Road under water near jetty",
            "location": "Harbor east"
        })),
    )
    .await;

    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(incident["kind"], "basic");
    assert_eq!(incident["type"], "flooding");
    assert_eq!(state.incidents.len(), 1);

    let (status, body) = request(
        &app,
        "POST",
        "/api/incidents",
        Some(&token),
        Some(json!({"type": "flooding"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Type and description are required");
}

#[tokio::test]
async fn test_concurrent_submissions_all_persist() {
    let (app, state) = app_with_engine("echo", &[CAUTION_ENGINE], 10_000);
    let token = register(&app, "ana@ex.com").await;

    let n = 12;
    let mut handles = Vec::new();
    for i in 0..n {
        let app = app.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            let mut features = bay_features();
            features["rainfall"] = json!(i as f64);
            let (status, _) = request(
                &app,
                "POST",
                "/api/incidents/report",
                Some(&token),
                Some(features),
            )
            .await;
            status
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(state.incidents.len(), n, "no submission lost or duplicated");

    let (status, snapshot) = request(
        &app,
        "GET",
        "/api/incidents/analytics/my",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["total"], n);
}

#[tokio::test]
async fn test_listing_is_owner_scoped() {
    let (app, _state) = app_with_engine("echo", &[CAUTION_ENGINE], 5_000);
    let ana = register(&app, "ana@ex.com").await;
    let ben = register(&app, "ben@ex.com").await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/incidents/report",
        Some(&ana),
        Some(bay_features()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, mine) = request(&app, "GET", "/api/incidents/my", Some(&ana), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (_, theirs) = request(&app, "GET", "/api/incidents/my", Some(&ben), None).await;
    assert_eq!(theirs.as_array().unwrap().len(), 0);
}
