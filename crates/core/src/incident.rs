//! Incident: one persisted user submission.
//!
//! Basic field reports and modelled assessments share one store, so the two
//! shapes live behind a single `kind`-tagged body. An incident is created
//! exactly once at submission time and never mutated afterwards.

use crate::features::FeatureSet;
use crate::inference::InferenceOutcome;
use crate::narrative::NarrativeReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    /// Assigned by the store at append time; empty on a draft.
    pub id: String,
    pub owner_id: String,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: IncidentBody,
}

/// Tagged variant body. Serializes flat alongside the envelope fields with a
/// `"kind": "basic" | "modelled"` discriminator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncidentBody {
    Basic(BasicIncident),
    Modelled(ModelledIncident),
}

/// Free-form field report: no inference involved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BasicIncident {
    #[serde(rename = "type")]
    pub incident_type: String,
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Assessment produced by the submission pipeline. The inference outcome is
/// recorded whether it succeeded or failed; the narrative is best-effort.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelledIncident {
    pub features: FeatureSet,
    pub inference: InferenceOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<NarrativeReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    pub observed_at: DateTime<Utc>,
}

impl Incident {
    /// Draft awaiting an id from the store.
    pub fn draft(owner_id: impl Into<String>, body: IncidentBody) -> Self {
        Self {
            id: String::new(),
            owner_id: owner_id.into(),
            recorded_at: Utc::now(),
            body,
        }
    }

    pub fn risk_score(&self) -> Option<f64> {
        match &self.body {
            IncidentBody::Modelled(m) => m.inference.risk_score(),
            IncidentBody::Basic(_) => None,
        }
    }

    pub fn region_name(&self) -> Option<&str> {
        match &self.body {
            IncidentBody::Modelled(m) => m.region_name.as_deref(),
            IncidentBody::Basic(_) => None,
        }
    }

    /// Observation instant for charting: the submitted timestamp for
    /// modelled incidents, the recording time otherwise.
    pub fn observed_at(&self) -> DateTime<Utc> {
        match &self.body {
            IncidentBody::Modelled(m) => m.observed_at,
            IncidentBody::Basic(_) => self.recorded_at,
        }
    }
}

// ============================================================================
// Public Alert Feed
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AlertSeverity {
    Low,
    Moderate,
    High,
}

/// Advisory shown on the public alerts feed. Seeded at startup; read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub severity: AlertSeverity,
    pub timestamp: DateTime<Utc>,
}
