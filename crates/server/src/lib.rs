//! Nereus API server library.
//!
//! Exposes the application state, router construction, and the pipeline
//! pieces so integration tests can drive the HTTP surface in-process.

pub mod auth;
pub mod enricher;
pub mod error;
pub mod incidents;
pub mod pipeline;
pub mod predictor;
pub mod store;

use axum::routing::{get, post};
use axum::{Json, Router};
use enricher::NarrativeEnricher;
use nereus_core::{AccessGate, Alert};
use predictor::InferenceClient;
use std::sync::Arc;
use store::{IncidentStore, UserDirectory};
use tower_http::cors::{Any, CorsLayer};

pub use error::ApiError;

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    pub gate: AccessGate,
    pub users: UserDirectory,
    pub incidents: Arc<dyn IncidentStore>,
    pub alerts: Vec<Alert>,
    pub predictor: Arc<dyn InferenceClient>,
    pub enricher: NarrativeEnricher,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        gate: AccessGate,
        incidents: Arc<dyn IncidentStore>,
        predictor: Arc<dyn InferenceClient>,
        enricher: NarrativeEnricher,
    ) -> Self {
        Self {
            gate,
            users: UserDirectory::with_demo_user(),
            incidents,
            alerts: store::seed_alerts(),
            predictor,
            enricher,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        // Public alert feed
        .route("/api/alerts", get(incidents::list_alerts))
        // Incidents
        .route("/api/incidents", post(incidents::create_incident))
        .route("/api/incidents/my", get(incidents::list_my_incidents))
        .route("/api/incidents/report", post(pipeline::submit_report))
        .route("/api/incidents/analytics/my", get(incidents::my_analytics))
        // Stateless model endpoints
        .route("/api/predict", post(pipeline::predict_only))
        .route("/api/ai-report", post(pipeline::ai_report))
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
