//! Paste storage operations backed by redb.
//!
//! Rows are keyed by an internal sequential row id. The public paste id only
//! appears in the row body and in the `paste_ids` unique index.

use super::tables::*;
use super::time_util::created_millis_key;
use crate::{error::AppError, models::paste::PasteRecord};
use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable, ReadableTableMetadata};
use std::sync::Arc;

/// Result of an insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Row committed under the given internal row id.
    Inserted { row_id: u64 },
    /// The public paste id is already present; nothing was written.
    IdTaken,
}

/// Accessor for paste-related redb tables.
pub struct PasteDb {
    db: Arc<redb::Database>,
}

fn deserialize_record(bytes: &[u8]) -> Result<PasteRecord, AppError> {
    Ok(bincode::deserialize(bytes)?)
}

fn next_sequence(
    table: &mut redb::Table<'_, &'static str, u64>,
    name: &str,
) -> Result<u64, AppError> {
    let current = table.get(name)?.map(|guard| guard.value()).unwrap_or(0);
    let next = current.checked_add(1).ok_or(AppError::Internal)?;
    table.insert(name, next)?;
    Ok(next)
}

impl PasteDb {
    /// Initialize paste tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PASTES)?;
        write_txn.open_table(PASTE_IDS)?;
        write_txn.open_table(PASTES_BY_CREATED)?;
        write_txn.open_table(SEQUENCES)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a new row plus its index entries atomically.
    ///
    /// The uniqueness check and the insert share one write transaction, so a
    /// concurrent insert of the same public id cannot slip in between.
    ///
    /// # Returns
    /// [`InsertOutcome::IdTaken`] without writing anything when the public id
    /// already exists.
    ///
    /// # Errors
    /// Returns an error when serialization or storage operations fail.
    pub fn insert(&self, record: &PasteRecord) -> Result<InsertOutcome, AppError> {
        let encoded = bincode::serialize(record)?;
        let created_key = created_millis_key(record.created_at);

        let write_txn = self.db.begin_write()?;
        let row_id = {
            let mut ids = write_txn.open_table(PASTE_IDS)?;
            if ids.get(record.paste_id.as_str())?.is_some() {
                return Ok(InsertOutcome::IdTaken);
            }

            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut by_created = write_txn.open_table(PASTES_BY_CREATED)?;

            let row_id = next_sequence(&mut sequences, PASTE_ROW_SEQUENCE)?;
            pastes.insert(row_id, encoded.as_slice())?;
            ids.insert(record.paste_id.as_str(), row_id)?;
            by_created.insert((created_key, row_id), ())?;
            row_id
        };
        write_txn.commit()?;
        Ok(InsertOutcome::Inserted { row_id })
    }

    /// Look up a row without touching its view counter.
    ///
    /// # Returns
    /// `Ok(Some(record))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, paste_id: &str) -> Result<Option<PasteRecord>, AppError> {
        let read_txn = self.db.begin_read()?;
        let ids = read_txn.open_table(PASTE_IDS)?;
        let Some(row_id) = ids.get(paste_id)?.map(|guard| guard.value()) else {
            return Ok(None);
        };
        let pastes = read_txn.open_table(PASTES)?;
        match pastes.get(row_id)? {
            Some(value) => Ok(Some(deserialize_record(value.value())?)),
            None => Ok(None),
        }
    }

    /// Increment a row's view counter and return the updated row.
    ///
    /// Read, increment and write-back run inside one write transaction. redb
    /// admits a single writer at a time, so concurrent fetches of the same id
    /// observe each other's increments and none are lost.
    ///
    /// Every counted read is therefore a durable commit. Fetches of different
    /// ids queue behind the one writer slot, each paying its own fsync; read-only
    /// lookups go through [`PasteDb::get`] instead.
    ///
    /// # Returns
    /// `Ok(Some(record))` with `views` including this fetch, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or (de)serialization fails.
    pub fn fetch_and_count(&self, paste_id: &str) -> Result<Option<PasteRecord>, AppError> {
        // Durable commit per counted read; serialized with every other writer.
        let write_txn = self.db.begin_write()?;
        let record = {
            let ids = write_txn.open_table(PASTE_IDS)?;
            let Some(row_id) = ids.get(paste_id)?.map(|guard| guard.value()) else {
                return Ok(None);
            };

            let mut pastes = write_txn.open_table(PASTES)?;
            let Some(guard) = pastes.get(row_id)? else {
                tracing::warn!(paste_id, row_id, "Paste id index points at a missing row");
                return Ok(None);
            };
            let mut record = deserialize_record(guard.value())?;
            drop(guard);

            record.views = record.views.saturating_add(1);
            let encoded = bincode::serialize(&record)?;
            pastes.insert(row_id, encoded.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(Some(record))
    }

    /// Remove up to `batch_size` rows created strictly before `cutoff`.
    ///
    /// Walks the creation index from the oldest row in one short write
    /// transaction, so foreground writers interleave between batches and no
    /// full-table scan is needed. Callers repeat until a batch comes back
    /// short.
    ///
    /// # Returns
    /// Number of rows removed by this batch.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn expire_batch(
        &self,
        cutoff: DateTime<Utc>,
        batch_size: usize,
    ) -> Result<usize, AppError> {
        let cutoff_key = created_millis_key(cutoff);
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut by_created = write_txn.open_table(PASTES_BY_CREATED)?;
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut ids = write_txn.open_table(PASTE_IDS)?;

            let mut expired = Vec::with_capacity(batch_size);
            for item in by_created.range(..(cutoff_key, 0u64))?.take(batch_size) {
                let (key, _) = item?;
                expired.push(key.value());
            }

            for &(created_key, row_id) in &expired {
                by_created.remove((created_key, row_id))?;
                let Some(guard) = pastes.remove(row_id)? else {
                    continue;
                };
                let record = deserialize_record(guard.value())?;
                drop(guard);

                let indexed_row = ids
                    .get(record.paste_id.as_str())?
                    .map(|guard| guard.value());
                if indexed_row == Some(row_id) {
                    ids.remove(record.paste_id.as_str())?;
                }
            }
            expired.len()
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Number of live rows.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn count(&self) -> Result<usize, AppError> {
        let read_txn = self.db.begin_read()?;
        let ids = read_txn.open_table(PASTE_IDS)?;
        Ok(ids.len()? as usize)
    }

    /// Rewrite the stored envelope of an existing row.
    ///
    /// Only used by tests that simulate on-disk corruption.
    #[cfg(test)]
    pub(crate) fn overwrite_ciphertext(
        &self,
        paste_id: &str,
        ciphertext: Vec<u8>,
    ) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let ids = write_txn.open_table(PASTE_IDS)?;
            let Some(row_id) = ids.get(paste_id)?.map(|guard| guard.value()) else {
                return Ok(false);
            };
            let mut pastes = write_txn.open_table(PASTES)?;
            let Some(guard) = pastes.get(row_id)? else {
                return Ok(false);
            };
            let mut record = deserialize_record(guard.value())?;
            drop(guard);
            record.ciphertext = ciphertext;
            let encoded = bincode::serialize(&record)?;
            pastes.insert(row_id, encoded.as_slice())?;
            true
        };
        write_txn.commit()?;
        Ok(updated)
    }
}
