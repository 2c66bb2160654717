//! Storage traits and error types
//!
//! This module defines the trait interface for record store backends and
//! associated error types.

use crate::record::Record;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Column mismatch in {path}: expected {expected:?}, found {found:?}")]
    ColumnMismatch {
        path: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Store is not writable: {0}")]
    Unwritable(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Everything a store held when the crawl started
#[derive(Debug, Clone, Default)]
pub struct LoadedRecords {
    pub identifiers: HashSet<String>,
    pub records: Vec<Record>,
    /// Rows that could not be read and were skipped
    pub skipped_rows: usize,
}

/// Trait for record store implementations
///
/// A store is a tabular dataset keyed by identifier whose columns are
/// `identifier` followed by the configured field names.
pub trait RecordStore {
    /// Reads the existing dataset
    ///
    /// A store that does not exist yet is an empty dataset, not an error.
    /// Malformed rows are skipped and counted.
    fn load(&mut self) -> StoreResult<LoadedRecords>;

    /// Adds records after the existing ones
    ///
    /// Previously stored rows are never modified or removed. May be called
    /// any number of times during a crawl.
    fn append(&mut self, records: &[Record]) -> StoreResult<()>;

    /// Makes every appended record durable
    fn flush(&mut self) -> StoreResult<()>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn load(&mut self) -> StoreResult<LoadedRecords> {
        (**self).load()
    }

    fn append(&mut self, records: &[Record]) -> StoreResult<()> {
        (**self).append(records)
    }

    fn flush(&mut self) -> StoreResult<()> {
        (**self).flush()
    }
}
