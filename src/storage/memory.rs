//! In-memory record store
//!
//! Used by tests and `--dry-run` style tooling. Records every append batch
//! so callers can assert on write behavior.

use crate::record::Record;
use crate::storage::traits::{LoadedRecords, RecordStore, StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Vec<Record>,
    append_batches: Vec<usize>,
    flushes: usize,
    fail_appends: bool,
    failing_flushes: usize,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with records from an earlier run
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Makes every subsequent `append` fail
    pub fn set_fail_appends(&mut self, fail: bool) {
        self.fail_appends = fail;
    }

    /// Makes the next `count` calls to `flush` fail
    pub fn fail_next_flushes(&mut self, count: usize) {
        self.failing_flushes = count;
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Size of each successful append, in call order
    pub fn append_batches(&self) -> &[usize] {
        &self.append_batches
    }

    /// Successful flushes
    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&mut self) -> StoreResult<LoadedRecords> {
        Ok(LoadedRecords {
            identifiers: self
                .records
                .iter()
                .map(|r| r.identifier().to_string())
                .collect(),
            records: self.records.clone(),
            skipped_rows: 0,
        })
    }

    fn append(&mut self, records: &[Record]) -> StoreResult<()> {
        if self.fail_appends {
            return Err(StoreError::Unwritable("memory store".to_string()));
        }
        self.records.extend_from_slice(records);
        self.append_batches.push(records.len());
        Ok(())
    }

    fn flush(&mut self) -> StoreResult<()> {
        if self.failing_flushes > 0 {
            self.failing_flushes -= 1;
            return Err(StoreError::Unwritable("memory store flush".to_string()));
        }
        self.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failing_appends_store_nothing() {
        let mut store = MemoryRecordStore::new();
        store.set_fail_appends(true);
        let record = Record::new("Acme LLC").unwrap();
        assert!(store.append(&[record.clone()]).is_err());
        assert!(store.records().is_empty());

        store.set_fail_appends(false);
        store.append(&[record]).unwrap();
        assert_eq!(store.append_batches(), &[1]);
        assert!(store.load().unwrap().identifiers.contains("Acme LLC"));
    }
}
