//! Normalized result of an inference engine invocation.
//!
//! A failed inference is data, not a fault: the pipeline records it inside
//! the incident and still returns 200, so clients must check for an `error`
//! key inside the `inference` object.

use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};

/// Successful classification from the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub predicted_risk_level: RiskLevel,
    /// Probability-like score in [0, 1].
    pub risk_score: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InferenceError {
    /// Engine timed out, exited abnormally, or produced unparseable output.
    InferenceUnavailable,
}

/// Failure record with the captured engine output for diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InferenceFailure {
    pub error: InferenceError,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// Either branch serializes flat: `{"predicted_risk_level": .., "risk_score": ..}`
/// or `{"error": "inference_unavailable", "raw": ..}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InferenceOutcome {
    Scored(Prediction),
    Failed(InferenceFailure),
}

impl InferenceOutcome {
    pub fn unavailable(raw: Option<String>) -> Self {
        InferenceOutcome::Failed(InferenceFailure {
            error: InferenceError::InferenceUnavailable,
            raw,
        })
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            InferenceOutcome::Scored(p) => Some(p),
            InferenceOutcome::Failed(_) => None,
        }
    }

    pub fn risk_score(&self) -> Option<f64> {
        self.prediction().map(|p| p.risk_score)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, InferenceOutcome::Failed(_))
    }
}
