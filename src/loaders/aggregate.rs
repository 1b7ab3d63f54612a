use std::cmp::Ordering;
use std::collections::HashMap;

use crate::loaders::labels::{
    extract_display_name, extract_key, extract_latest_value, first_number, is_nil_like,
};
use crate::loaders::profile::EntityProfile;
use crate::loaders::types::AggregatedEntity;
use crate::services::metric_api::RawSeries;

/// Key and name of the pseudo-entity built from an ungrouped dataset.
pub const AGGREGATE_KEY: &str = "__all__";
pub const AGGREGATE_NAME: &str = "All";

/// The amount a series contributes: an explicit amount label when present,
/// else its latest sample.
pub fn series_amount(series: &RawSeries, profile: &EntityProfile) -> f64 {
    first_number(&series.labels, profile.amount_fields)
        .unwrap_or_else(|| extract_latest_value(series))
}

/// Folds raw series into one [`AggregatedEntity`] per entity code.
///
/// Series without a usable code are dropped. A stored name that is still the
/// code placeholder is replaced by the first real name seen later; a real name
/// is never replaced.
pub fn aggregate(series: &[RawSeries], profile: &EntityProfile) -> HashMap<String, AggregatedEntity> {
    let mut entities: HashMap<String, AggregatedEntity> = HashMap::new();

    for s in series {
        let key = extract_key(&s.labels, profile);
        if key.is_empty() || is_nil_like(&key) {
            continue;
        }

        let name = extract_display_name(&s.labels, &key, profile);
        let amount = series_amount(s, profile);

        let entity = entities
            .entry(key.clone())
            .or_insert_with(|| AggregatedEntity::new(&key, &name));

        entity.total_amount += amount;
        entity.record_count += 1;
        if entity.name == entity.code && name != key {
            entity.name = name;
        }
        entity.labels = s.labels.clone();
    }

    entities
}

/// Folds every series into a single pseudo-entity. `None` for empty input.
pub fn aggregate_all(series: &[RawSeries], profile: &EntityProfile) -> Option<AggregatedEntity> {
    let last = series.last()?;
    let mut entity = AggregatedEntity::new(AGGREGATE_KEY, AGGREGATE_NAME);

    for s in series {
        entity.total_amount += series_amount(s, profile);
        entity.record_count += 1;
    }
    entity.labels = last.labels.clone();

    Some(entity)
}

/// Entities ordered by total amount, largest first; ties by code.
pub fn ranked(entities: HashMap<String, AggregatedEntity>) -> Vec<AggregatedEntity> {
    let mut list: Vec<_> = entities.into_values().collect();
    list.sort_by(|a, b| {
        b.total_amount
            .partial_cmp(&a.total_amount)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.code.cmp(&b.code))
    });
    list
}
