use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Risk classification emitted by the inference engine and echoed by the
/// narrative service. Serialized capitalized ("Safe") for wire compatibility
/// with both collaborators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Safe,
    Caution,
    Dangerous,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "Safe",
            RiskLevel::Caution => "Caution",
            RiskLevel::Dangerous => "Dangerous",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ();

    /// Case-insensitive parse; engine builds have disagreed on casing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("safe") {
            Ok(RiskLevel::Safe)
        } else if s.eq_ignore_ascii_case("caution") {
            Ok(RiskLevel::Caution)
        } else if s.eq_ignore_ascii_case("dangerous") {
            Ok(RiskLevel::Dangerous)
        } else {
            Err(())
        }
    }
}
