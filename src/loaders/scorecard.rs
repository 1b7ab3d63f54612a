use chrono::Utc;

use crate::loaders::grade::Grade;
use crate::loaders::labels::{first_non_empty, first_number};
use crate::loaders::risk::{RiskLevel, normalize_risk_level, risk_level_to_score};
use crate::loaders::types::{AggregatedEntity, RiskAssessment, Scorecard};

const QUALITY_FIELDS: &[&str] = &["quality_score", "quality_rating", "quality", "合格率"];
const ON_TIME_FIELDS: &[&str] = &[
    "on_time_delivery_rate",
    "on_time_rate",
    "delivery_rate",
    "准时交付率",
];
const RESPONSIVENESS_FIELDS: &[&str] = &[
    "responsiveness_score",
    "response_speed_score",
    "response_score",
    "responsiveness",
];
const RISK_LEVEL_FIELDS: &[&str] = &["risk_level", "risk_grade", "risk", "风险等级"];
const RISK_SCORE_FIELDS: &[&str] = &["risk_score", "risk_rating"];

/// Values used when a dimension is absent from the entity's labels.
const DEFAULT_QUALITY: f64 = 80.0;
const DEFAULT_ON_TIME: f64 = 85.0;
const DEFAULT_RESPONSIVENESS: f64 = 75.0;

/// Weight of each favorability dimension in the overall score.
struct Weights {
    quality: f64,
    on_time: f64,
    responsiveness: f64,
    risk: f64,
}

const WEIGHTS: Weights = Weights {
    quality: 0.3,
    on_time: 0.3,
    responsiveness: 0.2,
    risk: 0.2,
};

/// Thresholds below which a dimension is reported as a risk factor.
const QUALITY_FLOOR: f64 = 70.0;
const ON_TIME_FLOOR: f64 = 80.0;
const RESPONSIVENESS_FLOOR: f64 = 60.0;

fn score_or(entity: &AggregatedEntity, fields: &[&str], default: f64) -> f64 {
    first_number(&entity.labels, fields)
        .unwrap_or(default)
        .clamp(0.0, 100.0)
}

/// Per-dimension scores that all read "higher is better".
struct Favorability {
    quality: f64,
    on_time: f64,
    responsiveness: f64,
    risk: f64,
}

impl Favorability {
    fn weighted(&self, weights: &Weights) -> f64 {
        let total = self.quality * weights.quality
            + self.on_time * weights.on_time
            + self.responsiveness * weights.responsiveness
            + self.risk * weights.risk;
        let weight_sum =
            weights.quality + weights.on_time + weights.responsiveness + weights.risk;

        if weight_sum == 0.0 {
            0.0
        } else {
            total / weight_sum
        }
    }
}

/// Builds the composite view for one aggregated entity.
///
/// The risk rating reads "higher is worse"; it enters the overall score
/// as `100 - risk_rating`.
pub fn build_scorecard(entity: &AggregatedEntity) -> Scorecard {
    let quality = score_or(entity, QUALITY_FIELDS, DEFAULT_QUALITY);
    let on_time = score_or(entity, ON_TIME_FIELDS, DEFAULT_ON_TIME);
    let responsiveness = score_or(entity, RESPONSIVENESS_FIELDS, DEFAULT_RESPONSIVENESS);

    let level = normalize_risk_level(first_non_empty(&entity.labels, RISK_LEVEL_FIELDS).as_deref());
    let risk_rating = first_number(&entity.labels, RISK_SCORE_FIELDS)
        .map(|r| r.clamp(0.0, 100.0))
        .unwrap_or_else(|| risk_level_to_score(level));

    let overall = Favorability {
        quality,
        on_time,
        responsiveness,
        risk: 100.0 - risk_rating,
    }
    .weighted(&WEIGHTS);

    let mut factors = Vec::new();
    if level >= RiskLevel::High {
        factors.push(format!("risk level {level}"));
    }
    if quality < QUALITY_FLOOR {
        factors.push(format!("quality score {quality:.1} below {QUALITY_FLOOR}"));
    }
    if on_time < ON_TIME_FLOOR {
        factors.push(format!("on-time delivery {on_time:.1} below {ON_TIME_FLOOR}"));
    }
    if responsiveness < RESPONSIVENESS_FLOOR {
        factors.push(format!(
            "responsiveness {responsiveness:.1} below {RESPONSIVENESS_FLOOR}"
        ));
    }

    Scorecard {
        code: entity.code.clone(),
        name: entity.name.clone(),
        total_amount: entity.total_amount,
        record_count: entity.record_count,
        quality_score: quality,
        on_time_delivery_rate: on_time,
        responsiveness_score: responsiveness,
        risk_rating,
        overall_score: overall,
        overall_grade: Grade::from_score(overall),
        risk: RiskAssessment {
            level,
            rating: risk_rating,
            factors,
            assessed_at: Utc::now(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(labels: serde_json::Value) -> AggregatedEntity {
        let mut e = AggregatedEntity::new("S1", "Acme");
        e.total_amount = 150.0;
        e.record_count = 2;
        e.labels = serde_json::from_value(labels).unwrap();
        e
    }

    #[test]
    fn test_defaults_when_labels_missing() {
        let card = build_scorecard(&entity(json!({})));

        assert_eq!(card.quality_score, DEFAULT_QUALITY);
        assert_eq!(card.on_time_delivery_rate, DEFAULT_ON_TIME);
        assert_eq!(card.responsiveness_score, DEFAULT_RESPONSIVENESS);
        assert_eq!(card.risk.level, RiskLevel::Low);
        assert_eq!(card.risk_rating, 20.0);
        assert!(card.risk.factors.is_empty());
        assert_eq!(card.total_amount, 150.0);
    }

    #[test]
    fn test_overall_inverts_risk_once() {
        let card = build_scorecard(&entity(json!({
            "quality_score": 100,
            "on_time_delivery_rate": 100,
            "responsiveness_score": 100,
            "risk_level": "critical",
        })));

        // 0.8 * 100 + 0.2 * (100 - 95)
        assert!((card.overall_score - 81.0).abs() < 1e-9);
        assert_eq!(card.overall_grade, Grade::B);
        assert_eq!(card.risk_rating, 95.0);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum = WEIGHTS.quality + WEIGHTS.on_time + WEIGHTS.responsiveness + WEIGHTS.risk;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_each_dimension_carries_its_weight() {
        let base = build_scorecard(&entity(json!({
            "quality_score": 100,
            "on_time_delivery_rate": 100,
            "responsiveness_score": 100,
            "risk_score": 0,
        })));
        let weak_response = build_scorecard(&entity(json!({
            "quality_score": 100,
            "on_time_delivery_rate": 100,
            "responsiveness_score": 0,
            "risk_score": 0,
        })));

        assert!((base.overall_score - 100.0).abs() < 1e-9);
        assert!((weak_response.overall_score - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_lower_risk_scores_better() {
        let low = build_scorecard(&entity(json!({"risk_level": "低"})));
        let high = build_scorecard(&entity(json!({"risk_level": "高"})));

        assert!(low.overall_score > high.overall_score);
    }

    #[test]
    fn test_explicit_risk_score_wins_over_level() {
        let card = build_scorecard(&entity(json!({"risk_level": "high", "risk_score": "30"})));

        assert_eq!(card.risk.level, RiskLevel::High);
        assert_eq!(card.risk_rating, 30.0);
    }

    #[test]
    fn test_factors_report_breaches() {
        let card = build_scorecard(&entity(json!({
            "quality_score": "60",
            "on_time_rate": 70,
            "response_score": 50,
            "risk_level": "HIGH",
        })));

        assert_eq!(card.risk.factors.len(), 4);
        assert_eq!(card.risk.factors[0], "risk level high");
    }

    #[test]
    fn test_scores_are_clamped() {
        let card = build_scorecard(&entity(json!({"quality_score": 180, "risk_score": -5})));

        assert_eq!(card.quality_score, 100.0);
        assert_eq!(card.risk_rating, 0.0);
    }
}
