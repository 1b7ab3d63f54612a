//! Output formatting and persistence for loaded entities.
//!
//! Supports JSON printing and CSV append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::loaders::types::AggregatedEntity;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Flat CSV row for one entity.
#[derive(Debug, Serialize)]
pub struct EntityRow<'a> {
    pub timestamp: DateTime<Utc>,
    pub kind: &'a str,
    pub rank: usize,
    pub code: &'a str,
    pub name: &'a str,
    pub total_amount: f64,
    pub record_count: usize,
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends one row per entity to a CSV file, ranked in slice order.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records(path: &str, kind: &str, entities: &[AggregatedEntity]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = entities.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    let timestamp = Utc::now();
    for (i, entity) in entities.iter().enumerate() {
        writer.serialize(EntityRow {
            timestamp,
            kind,
            rank: i + 1,
            code: &entity.code,
            name: &entity.name,
            total_amount: entity.total_amount,
            record_count: entity.record_count,
        })?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn entities() -> Vec<AggregatedEntity> {
        let mut a = AggregatedEntity::new("S1", "Acme");
        a.total_amount = 150.0;
        a.record_count = 2;
        vec![a, AggregatedEntity::new("S2", "S2")]
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&entities()).unwrap();
    }

    #[test]
    fn test_append_records_creates_file() {
        let path = temp_path("supply_metrics_test_create.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        append_records(&path, "supplier", &entities()).unwrap();

        assert!(Path::new(&path).exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("S1,Acme,150.0,2"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let path = temp_path("supply_metrics_test_header.csv");
        let _ = fs::remove_file(&path);

        append_records(&path, "supplier", &entities()).unwrap();
        append_records(&path, "supplier", &entities()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 appends of 2 rows
        assert_eq!(content.lines().count(), 5);

        fs::remove_file(&path).unwrap();
    }
}
