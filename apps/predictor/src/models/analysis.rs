#![allow(dead_code)]

use serde::{Deserialize, Deserializer, Serialize};

/// One company/role record returned by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMatch {
    pub company_name: String,
    pub role_title: String,
    /// 0-100. Fractions are truncated and out-of-range values clamped on the way in.
    #[serde(deserialize_with = "deserialize_fit_score")]
    pub fit_score: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

/// Ordered role matches, best first as sent by the service.
/// Immutable once received.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult {
    pub matches: Vec<RoleMatch>,
}

impl AnalysisResult {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Scores outside [0, 100] are an upstream contract violation. They are
/// clamped here so everything downstream sees the declared domain.
/// Fractions are floored, so `79.6` stays below the 80 threshold.
fn deserialize_fit_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_fit_score(raw))
}

pub fn clamp_fit_score(raw: f64) -> u8 {
    if raw.is_nan() {
        tracing::warn!("fit_score is NaN; treating as 0");
        return 0;
    }
    let whole = raw.floor();
    if !(0.0..=100.0).contains(&whole) {
        tracing::warn!(fit_score = raw, "fit_score outside 0-100; clamping");
    }
    whole.clamp(0.0, 100.0) as u8
}
