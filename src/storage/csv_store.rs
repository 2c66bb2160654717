//! CSV record store
//!
//! The dataset is a single CSV file with a header row. New records are
//! appended to the end of the file; existing rows are never rewritten.

use crate::record::{FieldValue, Record, IDENTIFIER_COLUMN};
use crate::storage::traits::{LoadedRecords, RecordStore, StoreError, StoreResult};
use std::fs::{File, OpenOptions};
use std::path::PathBuf;

/// CSV-file storage backend
pub struct CsvRecordStore {
    path: PathBuf,
    columns: Vec<String>,
    writer: Option<csv::Writer<File>>,
}

impl CsvRecordStore {
    /// Creates a store over `path` with the given field columns
    ///
    /// Nothing touches the filesystem until `load` or `append`.
    pub fn new(path: impl Into<PathBuf>, columns: Vec<String>) -> Self {
        Self {
            path: path.into(),
            columns,
            writer: None,
        }
    }

    fn header(&self) -> Vec<String> {
        std::iter::once(IDENTIFIER_COLUMN.to_string())
            .chain(self.columns.iter().cloned())
            .collect()
    }

    fn open_writer(&mut self) -> StoreResult<&mut csv::Writer<File>> {
        if self.writer.is_none() {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let is_empty = std::fs::metadata(&self.path)
                .map(|m| m.len() == 0)
                .unwrap_or(true);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            if is_empty {
                writer.write_record(self.header())?;
            }
            self.writer = Some(writer);
        }
        self.writer
            .as_mut()
            .ok_or_else(|| StoreError::Unwritable(self.path.display().to_string()))
    }
}

impl RecordStore for CsvRecordStore {
    fn load(&mut self) -> StoreResult<LoadedRecords> {
        let mut loaded = LoadedRecords::default();

        if !self.path.exists() {
            tracing::info!("No dataset at {}, starting fresh", self.path.display());
            return Ok(loaded);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let found: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if found.is_empty() || found.iter().all(String::is_empty) {
            return Ok(loaded);
        }
        let expected = self.header();
        if found != expected {
            return Err(StoreError::ColumnMismatch {
                path: self.path.display().to_string(),
                expected,
                found,
            });
        }

        for (i, result) in reader.records().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("Row {} in {}: {}", i + 1, self.path.display(), e);
                    loaded.skipped_rows += 1;
                    continue;
                }
            };

            let Some(mut record) = row.get(0).and_then(|id| Record::new(id)) else {
                tracing::warn!("Row {} in {}: missing identifier", i + 1, self.path.display());
                loaded.skipped_rows += 1;
                continue;
            };
            for (offset, column) in self.columns.iter().enumerate() {
                let value = row
                    .get(offset + 1)
                    .map(FieldValue::from_cell)
                    .unwrap_or(FieldValue::NotFound);
                record.set(column.clone(), value);
            }

            loaded.identifiers.insert(record.identifier().to_string());
            loaded.records.push(record);
        }

        tracing::info!(
            "Loaded {} records from {}",
            loaded.records.len(),
            self.path.display()
        );
        Ok(loaded)
    }

    fn append(&mut self, records: &[Record]) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let columns = self.columns.clone();
        let writer = self.open_writer()?;
        for record in records {
            writer.write_record(record.to_row(&columns))?;
        }
        Ok(())
    }

    fn flush(&mut self) -> StoreResult<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
            writer.get_ref().sync_data()?;
        }
        Ok(())
    }
}
