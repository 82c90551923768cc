//! Narrative enricher: asks the external language-generation service for a
//! structured remediation briefing.
//!
//! The capability is either configured at construction (API key present) or
//! absent: request handling never probes the environment. Inside the
//! submission pipeline every failure degrades to `None`; the standalone
//! endpoint surfaces the error instead via [`NarrativeEnricher::generate`].

use nereus_core::{FeatureSet, InferenceOutcome, NarrativeReport, Prediction};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL_ID: &str = "gemini-1.5-flash";

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("narrative service not configured")]
    NotConfigured,
    #[error("narrative service request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("narrative service returned status {status}: {body}")]
    Service { status: u16, body: String },
    #[error("narrative service returned no candidate text")]
    EmptyResponse,
    #[error("narrative output did not match the report shape: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct EnricherConfig {
    pub api_key: String,
    pub model_id: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl EnricherConfig {
    /// `None` when no API key is present: absence of the capability is not
    /// an error.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty())?;
        let model_id =
            std::env::var("GEMINI_MODEL_ID").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());
        let api_base =
            std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let timeout_ms = std::env::var("GEMINI_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20_000);
        Some(Self {
            api_key,
            model_id,
            api_base,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

pub struct NarrativeEnricher {
    config: Option<EnricherConfig>,
    client: reqwest::Client,
}

impl NarrativeEnricher {
    pub fn new(config: Option<EnricherConfig>) -> Self {
        let timeout = config
            .as_ref()
            .map(|c| c.timeout)
            .unwrap_or(Duration::from_secs(20));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Pipeline entry point: best-effort, never blocks persistence. Returns
    /// `None` when the capability is absent, the inference failed (there is
    /// no prediction to narrate), or the service errors.
    pub async fn enrich(
        &self,
        features: &FeatureSet,
        inference: &InferenceOutcome,
    ) -> Option<NarrativeReport> {
        let prediction = inference.prediction()?;
        if !self.is_configured() {
            return None;
        }
        match self.generate(features, prediction).await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!("narrative enrichment degraded: {e}");
                None
            }
        }
    }

    /// Strict variant for the standalone enrichment endpoint, which has
    /// nothing to degrade to.
    pub async fn generate(
        &self,
        features: &FeatureSet,
        prediction: &Prediction,
    ) -> Result<NarrativeReport, EnrichError> {
        let config = self.config.as_ref().ok_or(EnrichError::NotConfigured)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            config.api_base, config.model_id, config.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(features, prediction),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::Service {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: GenerateResponse = response.json().await?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(EnrichError::EmptyResponse)?;

        Ok(serde_json::from_str(&text)?)
    }
}

/// Prompt confining the service to the documented report shape. JSON-only
/// output is requested both here and via the response MIME type.
fn build_prompt(features: &FeatureSet, prediction: &Prediction) -> String {
    let features_json =
        serde_json::to_string_pretty(features).unwrap_or_else(|_| "{}".to_string());
    format!(
        r#"You are a coastal resilience expert. Create a concise, structured report to brief
disaster management teams. Use the inputs and predicted risk to:
1) Summarize the situation and likely causes.
2) Assess immediate risk to life & ecosystems, esp. blue carbon (mangroves, seagrass).
3) Recommend concrete, prioritized remedies (operational & community actions) to protect blue carbon.
4) Suggest monitoring & data needs for the next 24-72 hours.

Return ONLY valid JSON with the following shape:
{{
  "title": "string",
  "summary": "string",
  "risk_assessment": {{
    "risk_level": "Safe | Caution | Dangerous",
    "risk_score": "number (0-1)",
    "drivers": ["string"]
  }},
  "recommended_remedies": [
    {{
      "priority": "High | Medium | Low",
      "action": "string",
      "owner": "Agency/Role",
      "timeframe": "Immediate | 24h | 72h",
      "why_it_helps_blue_carbon": "string"
    }}
  ],
  "monitoring_next_72h": ["string"],
  "notes": "string"
}}

Inputs:
{features_json}
Prediction:
- risk_level: {risk_level}
- risk_score: {risk_score}
"#,
        risk_level = prediction.predicted_risk_level,
        risk_score = prediction.risk_score,
    )
}

// ============================================================================
// Service Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
