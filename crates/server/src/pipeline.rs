//! Assessment orchestrator: validate → infer → enrich → assemble → append.
//!
//! Validation failures exit before any external call. An inference failure
//! is captured into the incident and the pipeline keeps going: the record
//! of a failed assessment is worth persisting. Persistence happens once, at
//! the end, so there is no partial write to roll back.

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use nereus_core::{
    Incident, IncidentBody, InferenceOutcome, ModelledIncident, NarrativeReport, Prediction,
    RiskInput, RiskLevel,
};
use serde::{Deserialize, Serialize};

/// Run one submission through the full pipeline and persist the result.
pub async fn run_assessment(
    state: &SharedState,
    owner_id: &str,
    input: RiskInput,
) -> Result<Incident, ApiError> {
    // Fail fast on missing mandatory readings; no external calls yet.
    let features = input.validate()?;

    let inference = state.predictor.predict(&features).await;
    let narrative = state.enricher.enrich(&features, &inference).await;

    let observed_at = features.observation_time().unwrap_or_else(Utc::now);
    let region_name = features.region_name.clone();
    let incident = state.incidents.append(Incident::draft(
        owner_id,
        IncidentBody::Modelled(ModelledIncident {
            features,
            inference,
            narrative,
            region_name,
            observed_at,
        }),
    ));
    tracing::info!(
        "assessment persisted: incident {} for {}",
        incident.id,
        owner_id
    );
    Ok(incident)
}

/// `POST /api/incidents/report`: the authenticated submission pipeline.
pub async fn submit_report(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Json(input): Json<RiskInput>,
) -> Result<Json<Incident>, ApiError> {
    let incident = run_assessment(&state, &claims.id, input).await?;
    Ok(Json(incident))
}

/// `POST /api/predict`: inference only, nothing persisted. Engine failures
/// still come back as 200 with an `error` field inside the body.
pub async fn predict_only(
    State(state): State<SharedState>,
    Json(input): Json<RiskInput>,
) -> Result<Json<InferenceOutcome>, ApiError> {
    let features = input.validate()?;
    Ok(Json(state.predictor.predict(&features).await))
}

#[derive(Debug, Deserialize)]
pub struct AiReportRequest {
    pub features: RiskInput,
    pub predicted_risk_level: RiskLevel,
    pub risk_score: f64,
}

#[derive(Debug, Serialize)]
pub struct AiReportResponse {
    pub ok: bool,
    pub ai_report: NarrativeReport,
}

/// `POST /api/ai-report`: enrichment only, nothing persisted. Unlike the
/// pipeline, this endpoint has no incident to degrade to, so service absence
/// and service failure surface as transport errors.
pub async fn ai_report(
    State(state): State<SharedState>,
    Json(req): Json<AiReportRequest>,
) -> Result<Json<AiReportResponse>, ApiError> {
    let features = req.features.validate()?;
    let prediction = Prediction {
        predicted_risk_level: req.predicted_risk_level,
        risk_score: req.risk_score,
    };

    let report = state
        .enricher
        .generate(&features, &prediction)
        .await
        .map_err(|e| match e {
            crate::enricher::EnrichError::NotConfigured => {
                ApiError::NotConfigured("GEMINI_API_KEY not set".to_string())
            }
            other => ApiError::Upstream(format!("Narrative service error: {other}")),
        })?;

    Ok(Json(AiReportResponse {
        ok: true,
        ai_report: report,
    }))
}
