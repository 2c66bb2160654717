//! Storage module for persisting captured records
//!
//! This module handles everything between the crawl and the dataset:
//! - The [`RecordStore`] trait and its CSV, SQLite and in-memory backends
//! - The [`Checkpoint`] that deduplicates and batches writes
//! - Schema management for the SQLite backend

mod checkpoint;
mod csv_store;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use checkpoint::{Checkpoint, DEFAULT_FLUSH_THRESHOLD};
pub use csv_store::CsvRecordStore;
pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;
pub use traits::{LoadedRecords, RecordStore, StoreError, StoreResult};

use crate::config::{OutputConfig, StoreFormat};
use std::path::Path;

/// Opens the record store an output section describes
///
/// # Arguments
///
/// * `output` - Output section of the directory profile
/// * `columns` - Field names, in profile order
///
/// # Returns
///
/// * `Ok(Box<dyn RecordStore>)` - Store ready for `load`
/// * `Err(StoreError)` - The SQLite database could not be opened
pub fn open_store(
    output: &OutputConfig,
    columns: Vec<String>,
) -> StoreResult<Box<dyn RecordStore + Send>> {
    let path = Path::new(&output.path);
    Ok(match output.format {
        StoreFormat::Csv => Box::new(CsvRecordStore::new(path, columns)),
        StoreFormat::Sqlite => Box::new(SqliteRecordStore::new(path, columns)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_store_by_format() {
        let dir = TempDir::new().unwrap();
        for (file, format) in [("out.csv", StoreFormat::Csv), ("out.db", StoreFormat::Sqlite)] {
            let output = OutputConfig {
                path: dir.path().join(file).display().to_string(),
                format,
            };
            let mut store = open_store(&output, vec!["Website".to_string()]).unwrap();
            assert!(store.load().unwrap().records.is_empty());
        }
    }
}
