pub mod analytics;
pub mod features;
pub mod incident;
pub mod inference;
pub mod narrative;
pub mod risk;
pub mod token;
pub mod user;

pub use analytics::{summarize, AnalyticsSnapshot, RegionCount, SeriesPoint};
pub use features::{FeatureSet, MissingFields, RiskInput, MANDATORY_NUMERIC_FIELDS};
pub use incident::{
    Alert, AlertSeverity, BasicIncident, Incident, IncidentBody, ModelledIncident,
};
pub use inference::{InferenceError, InferenceFailure, InferenceOutcome, Prediction};
pub use narrative::{NarrativeReport, Remedy, RiskAssessment};
pub use risk::RiskLevel;
pub use token::{AccessGate, Claims, TokenError};
pub use user::{digest_password, PublicUser, User};
