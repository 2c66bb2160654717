//! SQLite record store
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::record::{FieldValue, Record, IDENTIFIER_COLUMN};
use crate::storage::schema::{initialize_schema, quote_ident, RECORDS_TABLE};
use crate::storage::traits::{LoadedRecords, RecordStore, StoreResult};
use rusqlite::{params_from_iter, Connection};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteRecordStore {
    conn: Connection,
    columns: Vec<String>,
}

impl SqliteRecordStore {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `columns` - Field columns, in profile order
    pub fn new(path: &Path, columns: Vec<String>) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn, &columns)?;

        Ok(Self { conn, columns })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory(columns: Vec<String>) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn, &columns)?;
        Ok(Self { conn, columns })
    }

    fn column_list(&self) -> String {
        std::iter::once(IDENTIFIER_COLUMN)
            .chain(self.columns.iter().map(String::as_str))
            .map(quote_ident)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Number of stored records
    pub fn count(&self) -> StoreResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", RECORDS_TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl RecordStore for SqliteRecordStore {
    fn load(&mut self) -> StoreResult<LoadedRecords> {
        let mut loaded = LoadedRecords::default();
        let sql = format!(
            "SELECT {} FROM {} ORDER BY rowid",
            self.column_list(),
            RECORDS_TABLE
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let width = self.columns.len() + 1;
        let rows = stmt.query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, Option<String>>(i))
                .collect::<Result<Vec<_>, _>>()
        })?;

        for (i, row) in rows.enumerate() {
            let cells = match row {
                Ok(cells) => cells,
                Err(e) => {
                    tracing::warn!("Row {} in {}: {}", i + 1, RECORDS_TABLE, e);
                    loaded.skipped_rows += 1;
                    continue;
                }
            };
            let Some(mut record) = cells[0].as_deref().and_then(|id| Record::new(id)) else {
                loaded.skipped_rows += 1;
                continue;
            };
            for (column, cell) in self.columns.iter().zip(&cells[1..]) {
                let value = cell
                    .as_deref()
                    .map(FieldValue::from_cell)
                    .unwrap_or(FieldValue::NotFound);
                record.set(column.clone(), value);
            }
            loaded.identifiers.insert(record.identifier().to_string());
            loaded.records.push(record);
        }

        tracing::info!("Loaded {} records from {}", loaded.records.len(), RECORDS_TABLE);
        Ok(loaded)
    }

    /// Inserts the batch in one transaction
    ///
    /// An identifier that is already stored keeps its original row.
    fn append(&mut self, records: &[Record]) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let placeholders = vec!["?"; self.columns.len() + 1].join(", ");
        let sql = format!(
            "INSERT OR IGNORE INTO {} ({}) VALUES ({})",
            RECORDS_TABLE,
            self.column_list(),
            placeholders
        );

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for record in records {
                let values = std::iter::once(Some(record.identifier().to_string())).chain(
                    self.columns
                        .iter()
                        .map(|c| record.get(c).as_deref().map(str::to_string)),
                );
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Appends commit their own transaction, so there is nothing left to write
    fn flush(&mut self) -> StoreResult<()> {
        Ok(())
    }
}
