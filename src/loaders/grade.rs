//! Letter grades for composite scores.

use serde::Serialize;
use std::fmt;

/// Letter grade of a 0–100 overall score, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    F,
    D,
    C,
    B,
    A,
    #[serde(rename = "A+")]
    APlus,
}

/// Lowest score that earns each grade, best grade first.
static CUTOFFS: &[(f64, Grade)] = &[
    (95.0, Grade::APlus),
    (90.0, Grade::A),
    (80.0, Grade::B),
    (65.0, Grade::C),
    (40.0, Grade::D),
];

impl Grade {
    /// Grades a score. Anything below every cutoff, NaN included, is `F`.
    pub fn from_score(score: f64) -> Self {
        CUTOFFS
            .iter()
            .find(|(floor, _)| score >= *floor)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::F)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
