//! NarrativeReport: the structured remediation briefing returned by the
//! external language-generation service.
//!
//! The service is prompted to return ONLY this JSON shape; anything that
//! fails to deserialize into it is treated as an enrichment failure upstream.
//! Wire keys follow the service contract (`monitoring_next_72h`,
//! `why_it_helps_blue_carbon`), not the Rust field names.

use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NarrativeReport {
    pub title: String,
    pub summary: String,
    pub risk_assessment: RiskAssessment,
    #[serde(default)]
    pub recommended_remedies: Vec<Remedy>,
    #[serde(default, rename = "monitoring_next_72h")]
    pub monitoring_window: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    #[serde(default)]
    pub drivers: Vec<String>,
}

/// One prioritized remediation action for disaster-management teams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Remedy {
    /// "High" | "Medium" | "Low": left as free text; the service has never
    /// been perfectly consistent about casing.
    pub priority: String,
    pub action: String,
    #[serde(default)]
    pub owner: String,
    /// "Immediate" | "24h" | "72h"
    #[serde(default)]
    pub timeframe: String,
    #[serde(default, rename = "why_it_helps_blue_carbon")]
    pub rationale: String,
}
