//! Checkpoint over a record store
//!
//! Tracks every identifier already captured and buffers new records so the
//! store is written in batches. The crawl consults `has` before visiting a
//! detail page, which is what makes re-runs idempotent.

use crate::record::Record;
use crate::storage::traits::{RecordStore, StoreResult};
use std::collections::HashSet;

/// Default batch size before records are written out
pub const DEFAULT_FLUSH_THRESHOLD: usize = 5;

pub struct Checkpoint<S> {
    store: S,
    known: HashSet<String>,
    pending: Vec<Record>,
    pending_ids: HashSet<String>,
    /// The pending batch reached the store but was not flushed yet
    appended: bool,
    threshold: usize,
}

impl<S: RecordStore> Checkpoint<S> {
    /// # Arguments
    ///
    /// * `store` - Backend the batches are written to
    /// * `threshold` - Pending batch size that triggers a write (minimum 1)
    pub fn new(store: S, threshold: usize) -> Self {
        Self {
            store,
            known: HashSet::new(),
            pending: Vec::new(),
            pending_ids: HashSet::new(),
            appended: false,
            threshold: threshold.max(1),
        }
    }

    /// Reads the store's identifiers; returns how many records it held
    pub fn load(&mut self) -> StoreResult<usize> {
        let loaded = self.store.load()?;
        if loaded.skipped_rows > 0 {
            tracing::warn!("Skipped {} malformed rows in the dataset", loaded.skipped_rows);
        }
        self.known.extend(loaded.identifiers);
        Ok(loaded.records.len())
    }

    /// True if the identifier is stored or waiting in the pending batch
    pub fn has(&self, identifier: &str) -> bool {
        self.known.contains(identifier) || self.pending_ids.contains(identifier)
    }

    /// Adds a record to the pending batch
    ///
    /// A record whose identifier is already present is dropped; returns
    /// whether it was staged.
    pub fn stage(&mut self, record: Record) -> bool {
        if self.has(record.identifier()) {
            tracing::debug!("Already captured: {}", record.identifier());
            return false;
        }
        self.pending_ids.insert(record.identifier().to_string());
        self.pending.push(record);
        true
    }

    /// Writes the pending batch if forced or at the threshold
    ///
    /// Returns the number of records written. On error the batch is kept so
    /// a later flush can retry it. A batch that was appended but not flushed
    /// is never appended a second time; the retry only flushes the store.
    pub fn flush(&mut self, force: bool) -> StoreResult<usize> {
        if self.pending.is_empty() || (!force && self.pending.len() < self.threshold) {
            return Ok(0);
        }

        if !self.appended {
            self.store.append(&self.pending)?;
            self.appended = true;
        }
        self.store.flush()?;

        let written = self.pending.len();
        self.known.extend(self.pending_ids.drain());
        self.pending.clear();
        self.appended = false;
        tracing::info!("Saved {} records ({} total)", written, self.known.len());
        Ok(written)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn known_len(&self) -> usize {
        self.known.len()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
