//! Basic incident reports, the owner-scoped listing and analytics reads,
//! and the public alert feed.

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;
use axum::extract::State;
use axum::Json;
use nereus_core::{
    summarize, Alert, AnalyticsSnapshot, BasicIncident, Incident, IncidentBody,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct BasicIncidentRequest {
    #[serde(rename = "type")]
    pub incident_type: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub photo: Option<String>,
}

/// `POST /api/incidents`: field report without inference.
pub async fn create_incident(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<BasicIncidentRequest>,
) -> Result<Json<Incident>, ApiError> {
    let (incident_type, description) = match (req.incident_type, req.description) {
        (Some(t), Some(d)) if !t.is_empty() && !d.is_empty() => (t, d),
        _ => {
            return Err(ApiError::InvalidInput(
                "Type and description are required".to_string(),
            ))
        }
    };

    let incident = state.incidents.append(Incident::draft(
        claims.id,
        IncidentBody::Basic(BasicIncident {
            incident_type,
            description,
            location: req.location.unwrap_or_default(),
            lat: req.lat.filter(|s| !s.is_empty()),
            lng: req.lng.filter(|s| !s.is_empty()),
            photo: req.photo,
        }),
    ));
    Ok(Json(incident))
}

/// `GET /api/incidents/my`: owner-filtered, newest first.
pub async fn list_my_incidents(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
) -> Json<Vec<Incident>> {
    Json(state.incidents.list_by_owner(&claims.id))
}

/// `GET /api/incidents/analytics/my`: recomputed on every read; there is
/// no cached view to invalidate.
pub async fn my_analytics(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
) -> Json<AnalyticsSnapshot> {
    let incidents = state.incidents.list_by_owner(&claims.id);
    Json(summarize(&incidents))
}

/// `GET /api/alerts`: public advisories, newest first.
pub async fn list_alerts(State(state): State<SharedState>) -> Json<Vec<Alert>> {
    let mut alerts = state.alerts.clone();
    alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Json(alerts)
}
