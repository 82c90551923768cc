//! Inference client: invokes the external risk engine and normalizes
//! whatever happens into an [`InferenceOutcome`].
//!
//! The engine is a subprocess per request: the feature JSON goes to stdin, a
//! result JSON comes back on stdout. Timeout, abnormal exit, and unparseable
//! output all normalize to `inference_unavailable` with the captured output
//! attached: a failed inference is valid data, not a system fault, so this
//! module never returns an error.

use async_trait::async_trait;
use nereus_core::{FeatureSet, InferenceOutcome, Prediction, RiskLevel};
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Pluggable capability so the orchestrator never learns how predictions are
/// produced. Production keeps one implementation; a warm worker pool would
/// slot in behind the same trait.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn predict(&self, features: &FeatureSet) -> InferenceOutcome;
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interpreter or binary to execute.
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment passed to the engine (e.g. MODEL_PATH).
    pub env: Vec<(String, String)>,
    pub timeout: Duration,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let program = std::env::var("PYTHON_PATH").unwrap_or_else(|_| "python".to_string());
        let script =
            std::env::var("PREDICT_SCRIPT").unwrap_or_else(|_| "ml/predict.py".to_string());
        let timeout_ms = std::env::var("PREDICT_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(15_000);
        let mut env = Vec::new();
        if let Ok(model_path) = std::env::var("MODEL_PATH") {
            env.push(("MODEL_PATH".to_string(), model_path));
        }
        Self {
            program,
            args: vec![script],
            env,
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

pub struct SubprocessPredictor {
    config: EngineConfig,
}

impl SubprocessPredictor {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl InferenceClient for SubprocessPredictor {
    async fn predict(&self, features: &FeatureSet) -> InferenceOutcome {
        // FeatureSet serializes its known fields plus any passthrough extras,
        // which is exactly the forward-compatible payload the engine expects.
        let payload = match serde_json::to_vec(features) {
            Ok(p) => p,
            Err(e) => return InferenceOutcome::unavailable(Some(format!("serialize: {e}"))),
        };

        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &self.config.env {
            command.env(key, value);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                return InferenceOutcome::unavailable(Some(format!(
                    "spawn {}: {e}",
                    self.config.program
                )))
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&payload).await {
                tracing::warn!("engine stdin write failed: {e}");
            }
            // Dropping stdin closes the pipe so the engine sees EOF.
        }

        let output =
            match tokio::time::timeout(self.config.timeout, child.wait_with_output()).await {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => {
                    return InferenceOutcome::unavailable(Some(format!("engine io: {e}")))
                }
                Err(_) => {
                    tracing::warn!(
                        "inference engine timed out after {}ms",
                        self.config.timeout.as_millis()
                    );
                    return InferenceOutcome::unavailable(Some(format!(
                        "timeout after {}ms",
                        self.config.timeout.as_millis()
                    )));
                }
            };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return InferenceOutcome::unavailable(Some(format!(
                "exit {:?}: {}",
                output.status.code(),
                if stderr.trim().is_empty() {
                    stdout.as_str()
                } else {
                    stderr.trim()
                }
            )));
        }

        parse_engine_output(&stdout)
    }
}

/// Lenient view of the engine's stdout. Older engine builds emit `label`
/// instead of `predicted_risk_level`, and in-band failures arrive as an
/// `error` key with exit code 0.
#[derive(Debug, Deserialize)]
struct EngineOutput {
    #[serde(alias = "label")]
    predicted_risk_level: Option<String>,
    risk_score: Option<f64>,
    error: Option<String>,
}

fn parse_engine_output(stdout: &str) -> InferenceOutcome {
    let parsed: EngineOutput = match serde_json::from_str(stdout) {
        Ok(parsed) => parsed,
        Err(_) => return InferenceOutcome::unavailable(Some(stdout.to_string())),
    };

    if let Some(error) = parsed.error {
        tracing::warn!("inference engine reported failure: {error}");
        return InferenceOutcome::unavailable(Some(stdout.to_string()));
    }

    let level = parsed
        .predicted_risk_level
        .as_deref()
        .and_then(|s| s.parse::<RiskLevel>().ok());
    match (level, parsed.risk_score) {
        (Some(predicted_risk_level), Some(risk_score)) => {
            InferenceOutcome::Scored(Prediction {
                predicted_risk_level,
                risk_score,
            })
        }
        _ => InferenceOutcome::unavailable(Some(stdout.to_string())),
    }
}
