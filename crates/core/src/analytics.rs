//! Per-owner aggregate view, recomputed from the store on every request.
//! Nothing here is cached or persisted, so there is no invalidation to get
//! wrong.

use crate::incident::Incident;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const UNKNOWN_REGION: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsSnapshot {
    pub total: usize,
    pub average_risk_score: f64,
    pub by_region: Vec<RegionCount>,
    pub series: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionCount {
    pub region: String,
    pub count: usize,
}

/// One charting point: observation time (epoch ms) and risk score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub t: i64,
    pub risk: f64,
}

/// Summarize one owner's incidents.
///
/// Incidents without a successful inference contribute 0 to the average's
/// numerator but still count in `total`, so the average skews low when the
/// engine has been failing. Kept as-is pending a product decision.
pub fn summarize(incidents: &[Incident]) -> AnalyticsSnapshot {
    let total = incidents.len();

    let risk_sum: f64 = incidents
        .iter()
        .map(|i| i.risk_score().unwrap_or(0.0))
        .sum();
    let average_risk_score = if total > 0 {
        risk_sum / total as f64
    } else {
        0.0
    };

    let mut regions: BTreeMap<&str, usize> = BTreeMap::new();
    for incident in incidents {
        *regions
            .entry(incident.region_name().unwrap_or(UNKNOWN_REGION))
            .or_default() += 1;
    }
    let by_region = regions
        .into_iter()
        .map(|(region, count)| RegionCount {
            region: region.to_string(),
            count,
        })
        .collect();

    let mut series: Vec<SeriesPoint> = incidents
        .iter()
        .map(|i| SeriesPoint {
            t: i.observed_at().timestamp_millis(),
            risk: i.risk_score().unwrap_or(0.0),
        })
        .collect();
    series.sort_by_key(|p| p.t);

    AnalyticsSnapshot {
        total,
        average_risk_score,
        by_region,
        series,
    }
}
