//! Risk level normalization.

use serde::Serialize;
use std::fmt;

/// Canonical four-level risk scale, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

static ALIASES: &[(&str, RiskLevel)] = &[
    ("low", RiskLevel::Low),
    ("低", RiskLevel::Low),
    ("低风险", RiskLevel::Low),
    ("medium", RiskLevel::Medium),
    ("moderate", RiskLevel::Medium),
    ("中", RiskLevel::Medium),
    ("中等", RiskLevel::Medium),
    ("中风险", RiskLevel::Medium),
    ("high", RiskLevel::High),
    ("高", RiskLevel::High),
    ("高风险", RiskLevel::High),
    ("critical", RiskLevel::Critical),
    ("severe", RiskLevel::Critical),
    ("严重", RiskLevel::Critical),
    ("极高", RiskLevel::Critical),
    ("紧急", RiskLevel::Critical),
];

/// Maps a free-form risk descriptor onto [`RiskLevel`].
///
/// Matching is case-insensitive after trimming. Missing or unrecognized input
/// is [`RiskLevel::Low`].
pub fn normalize_risk_level(raw: Option<&str>) -> RiskLevel {
    let Some(raw) = raw else {
        return RiskLevel::Low;
    };
    let needle = raw.trim().to_lowercase();

    ALIASES
        .iter()
        .find(|(alias, _)| *alias == needle)
        .map(|(_, level)| *level)
        .unwrap_or(RiskLevel::Low)
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric severity of a level, 0..=100 with higher meaning worse.
pub fn risk_level_to_score(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::Low => 20.0,
        RiskLevel::Medium => 50.0,
        RiskLevel::High => 80.0,
        RiskLevel::Critical => 95.0,
    }
}
