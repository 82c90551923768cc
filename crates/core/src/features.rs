//! FeatureSet: the environmental readings submitted for assessment.
//!
//! The five numeric fields are mandatory: present-but-zero is a valid
//! reading, absence is a validation failure. Submissions therefore
//! deserialize into [`RiskInput`] (every numeric optional) so validation can
//! name each missing field, instead of letting serde reject the body with a
//! generic message.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Numeric fields the inference engine requires, in the order it expects.
pub const MANDATORY_NUMERIC_FIELDS: [&str; 5] = [
    "tide_height",
    "wind_speed",
    "sea_temp",
    "rainfall",
    "mangrove_index",
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("missing required numeric fields: {}", missing.join(", "))]
pub struct MissingFields {
    pub missing: Vec<&'static str>,
}

/// A validated feature set. Unknown extra fields are carried in `extra` and
/// passed through to the engine unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSet {
    pub tide_height: f64,
    pub wind_speed: f64,
    pub sea_temp: f64,
    pub rainfall: f64,
    pub mangrove_index: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past_event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tide_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_stamp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureSet {
    /// Parse the submitted `time_stamp` as the observation instant.
    ///
    /// Accepts RFC 3339, the `datetime-local` form the reporting UI emits
    /// ("2025-08-07T14:30"), or an epoch-milliseconds integer. Returns `None`
    /// when absent or unparseable; callers fall back to the recording time.
    pub fn observation_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.time_stamp.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
            return Some(Utc.from_utc_datetime(&naive));
        }
        if let Ok(ms) = raw.parse::<i64>() {
            return Utc.timestamp_millis_opt(ms).single();
        }
        None
    }
}

/// Raw submission body for the prediction endpoints. Mirrors the engine's
/// input schema but with every numeric optional so [`RiskInput::validate`]
/// can report exactly which mandatory readings are absent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RiskInput {
    pub tide_height: Option<f64>,
    pub wind_speed: Option<f64>,
    pub sea_temp: Option<f64>,
    pub rainfall: Option<f64>,
    pub mangrove_index: Option<f64>,
    #[serde(default)]
    pub past_event: Option<String>,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub tide_zone: Option<String>,
    #[serde(default)]
    pub time_stamp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RiskInput {
    /// Promote the submission to a [`FeatureSet`], naming every missing
    /// mandatory numeric. Zero values pass; absent values fail.
    pub fn validate(self) -> Result<FeatureSet, MissingFields> {
        let mut missing = Vec::new();
        if self.tide_height.is_none() {
            missing.push(MANDATORY_NUMERIC_FIELDS[0]);
        }
        if self.wind_speed.is_none() {
            missing.push(MANDATORY_NUMERIC_FIELDS[1]);
        }
        if self.sea_temp.is_none() {
            missing.push(MANDATORY_NUMERIC_FIELDS[2]);
        }
        if self.rainfall.is_none() {
            missing.push(MANDATORY_NUMERIC_FIELDS[3]);
        }
        if self.mangrove_index.is_none() {
            missing.push(MANDATORY_NUMERIC_FIELDS[4]);
        }
        if !missing.is_empty() {
            return Err(MissingFields { missing });
        }

        Ok(FeatureSet {
            tide_height: self.tide_height.unwrap_or_default(),
            wind_speed: self.wind_speed.unwrap_or_default(),
            sea_temp: self.sea_temp.unwrap_or_default(),
            rainfall: self.rainfall.unwrap_or_default(),
            mangrove_index: self.mangrove_index.unwrap_or_default(),
            past_event: none_if_blank(self.past_event),
            region_name: none_if_blank(self.region_name),
            tide_zone: none_if_blank(self.tide_zone),
            time_stamp: none_if_blank(self.time_stamp),
            extra: self.extra,
        })
    }
}

/// The reporting form submits empty strings for untouched optional fields.
fn none_if_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
