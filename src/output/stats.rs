//! Statistics over a stored dataset
//!
//! This module provides functionality for measuring how complete the
//! captured records are, field by field.

use crate::record::Record;
use crate::storage::{RecordStore, StoreResult};

/// Coverage statistics for a dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetStatistics {
    /// Number of records
    pub total_records: usize,

    /// Per field, in profile order: how many records have a value
    pub coverage: Vec<(String, usize)>,

    /// Records where every field is `NotFound`
    pub empty_records: usize,

    /// Rows the store could not read
    pub skipped_rows: usize,
}

/// Computes field coverage over records
///
/// # Arguments
///
/// * `records` - The records to measure
/// * `columns` - Field names, in profile order
pub fn compute_statistics(records: &[Record], columns: &[String]) -> DatasetStatistics {
    let coverage = columns
        .iter()
        .map(|column| {
            let found = records.iter().filter(|r| r.get(column).is_found()).count();
            (column.clone(), found)
        })
        .collect();

    let empty_records = records
        .iter()
        .filter(|r| columns.iter().all(|c| !r.get(c).is_found()))
        .count();

    DatasetStatistics {
        total_records: records.len(),
        coverage,
        empty_records,
        skipped_rows: 0,
    }
}

/// Loads a store and measures it
pub fn load_statistics<S: RecordStore + ?Sized>(
    store: &mut S,
    columns: &[String],
) -> StoreResult<DatasetStatistics> {
    let loaded = store.load()?;
    let mut stats = compute_statistics(&loaded.records, columns);
    stats.skipped_rows = loaded.skipped_rows;
    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");

    println!("Overview:");
    println!("  Records: {}", stats.total_records);
    println!("  Records without any field: {}", stats.empty_records);
    if stats.skipped_rows > 0 {
        println!("  Unreadable rows: {}", stats.skipped_rows);
    }
    println!();

    println!("Field Coverage:");
    for (field, found) in &stats.coverage {
        let percentage = if stats.total_records > 0 {
            (*found as f64 / stats.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", field, found, percentage);
    }
}
