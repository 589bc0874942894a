//! Async paste store used by request handlers and the sweeper.
//!
//! Every storage call runs on tokio's blocking pool under a timeout. When the
//! timeout fires the caller gets [`AppError::StorageUnavailable`]; the blocking
//! work is left to finish and its result is discarded.

use crate::config::Config;
use crate::constants::{EXPIRY_BATCH_SIZE, MAX_ID_ALLOCATION_ATTEMPTS};
use crate::crypto::{CodecError, PasteCipher};
use crate::db::paste::InsertOutcome;
use crate::db::Database;
use crate::error::AppError;
use crate::models::paste::{normalize_language, FetchedPaste, PasteRecord};
use crate::naming::{is_valid_paste_id, IdAllocator, RandomIdAllocator};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Caller-supplied bounds for store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    /// Largest accepted paste, in bytes.
    pub max_paste_size: usize,
    /// Upper bound for a single storage call.
    pub storage_timeout: Duration,
}

impl StoreLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_paste_size: config.max_paste_size,
            storage_timeout: config.storage_timeout,
        }
    }
}

/// Paste store: id allocation, encryption at rest, counted reads, expiry.
#[derive(Clone)]
pub struct PasteStore {
    db: Arc<Database>,
    cipher: Arc<PasteCipher>,
    allocator: Arc<dyn IdAllocator>,
    limits: StoreLimits,
}

impl PasteStore {
    /// Build a store that allocates ids from the OS random source.
    pub fn new(db: Arc<Database>, cipher: PasteCipher, limits: StoreLimits) -> Self {
        Self::with_allocator(db, cipher, limits, Arc::new(RandomIdAllocator))
    }

    /// Build a store with a custom id allocator.
    pub fn with_allocator(
        db: Arc<Database>,
        cipher: PasteCipher,
        limits: StoreLimits,
        allocator: Arc<dyn IdAllocator>,
    ) -> Self {
        Self {
            db,
            cipher: Arc::new(cipher),
            allocator,
            limits,
        }
    }

    /// Shared database handle backing this store.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    async fn run_storage<T, F>(&self, op: &'static str, work: F) -> Result<T, AppError>
    where
        F: FnOnce(&Database) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        let timeout = self.limits.storage_timeout;
        let task = tokio::task::spawn_blocking(move || work(db.as_ref()));
        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                tracing::error!(op, "Storage task failed: {}", join_err);
                Err(AppError::Internal)
            }
            Err(_) => {
                tracing::warn!(
                    op,
                    timeout_ms = timeout.as_millis() as u64,
                    "Storage call timed out"
                );
                Err(AppError::StorageUnavailable(format!(
                    "{} did not complete within {} ms",
                    op,
                    timeout.as_millis()
                )))
            }
        }
    }

    /// Store a new paste and return its public id.
    ///
    /// # Arguments
    /// - `plaintext`: Paste content; must be non-empty and within `max_paste_size`.
    /// - `language`: Display label; blank or missing becomes `"plaintext"`.
    ///
    /// # Returns
    /// The 12-character public id of the committed entry (`views = 0`).
    ///
    /// # Errors
    /// - [`AppError::Validation`] for empty/oversized content or a bad label.
    /// - [`AppError::AllocationExhausted`] when every allocated id collided.
    /// - [`AppError::Entropy`] when the random source fails.
    /// - [`AppError::StorageUnavailable`] on timeout.
    pub async fn create(
        &self,
        plaintext: &[u8],
        language: Option<&str>,
    ) -> Result<String, AppError> {
        if plaintext.is_empty() {
            return Err(AppError::Validation(
                "Paste content must not be empty".to_string(),
            ));
        }
        if plaintext.len() > self.limits.max_paste_size {
            return Err(AppError::Validation(format!(
                "Paste size exceeds maximum of {} bytes",
                self.limits.max_paste_size
            )));
        }
        let language = normalize_language(language)?;

        let ciphertext = self.cipher.encrypt(plaintext).map_err(|err| match err {
            CodecError::Entropy(message) => AppError::Entropy(message),
            other => {
                tracing::error!("Failed to seal paste content: {}", other);
                AppError::Internal
            }
        })?;

        for attempt in 1..=MAX_ID_ALLOCATION_ATTEMPTS {
            let paste_id = self.allocator.allocate()?;
            let record = PasteRecord::new(paste_id.clone(), ciphertext.clone(), language.clone());
            let outcome = self
                .run_storage("create", move |db| db.pastes.insert(&record))
                .await?;

            match outcome {
                InsertOutcome::Inserted { row_id } => {
                    tracing::info!(
                        paste_id = %paste_id,
                        row_id,
                        language = %language,
                        bytes = plaintext.len(),
                        "Created paste"
                    );
                    return Ok(paste_id);
                }
                InsertOutcome::IdTaken => {
                    tracing::warn!(
                        paste_id = %paste_id,
                        attempt,
                        "Paste id collision; allocating another"
                    );
                }
            }
        }

        tracing::error!(
            attempts = MAX_ID_ALLOCATION_ATTEMPTS,
            "Giving up on paste id allocation"
        );
        Err(AppError::AllocationExhausted {
            attempts: MAX_ID_ALLOCATION_ATTEMPTS,
        })
    }

    /// Fetch a paste, counting this read.
    ///
    /// # Returns
    /// Decrypted content plus metadata; `views` includes this fetch.
    ///
    /// # Errors
    /// - [`AppError::NotFound`] when the id is unknown, malformed, or purged.
    /// - [`AppError::CorruptEntry`] when the stored envelope does not decrypt.
    /// - [`AppError::StorageUnavailable`] on timeout.
    pub async fn fetch(&self, paste_id: &str) -> Result<FetchedPaste, AppError> {
        if !is_valid_paste_id(paste_id) {
            return Err(AppError::NotFound);
        }

        let lookup_id = paste_id.to_string();
        let record = self
            .run_storage("fetch", move |db| db.pastes.fetch_and_count(&lookup_id))
            .await?
            .ok_or(AppError::NotFound)?;

        let content = self.cipher.decrypt(&record.ciphertext).map_err(|source| {
            tracing::error!(paste_id, error = %source, "Stored paste failed to decrypt");
            AppError::CorruptEntry {
                paste_id: paste_id.to_string(),
                source,
            }
        })?;

        tracing::debug!(paste_id, views = record.views, "Fetched paste");
        Ok(FetchedPaste {
            content,
            language: record.language,
            views: record.views,
            created_at: record.created_at,
        })
    }

    /// Look up a stored row without counting a view or decrypting.
    ///
    /// # Errors
    /// Returns [`AppError::StorageUnavailable`] on timeout, or a storage error.
    pub async fn peek(&self, paste_id: &str) -> Result<Option<PasteRecord>, AppError> {
        let lookup_id = paste_id.to_string();
        self.run_storage("peek", move |db| db.pastes.get(&lookup_id))
            .await
    }

    /// Number of stored entries.
    ///
    /// # Errors
    /// Returns [`AppError::StorageUnavailable`] on timeout, or a storage error.
    pub async fn count(&self) -> Result<usize, AppError> {
        self.run_storage("count", |db| db.pastes.count()).await
    }

    /// Permanently remove entries created more than `retention` ago.
    ///
    /// Each batch is a separate bounded storage call, so a large backlog does
    /// not hold a write transaction for the whole sweep.
    ///
    /// # Returns
    /// Number of entries removed.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for a window too large to represent, or
    /// the first storage failure. Batches already committed stay removed.
    pub async fn expire_older_than(&self, retention: Duration) -> Result<usize, AppError> {
        let window = chrono::Duration::from_std(retention)
            .map_err(|_| AppError::Validation("Retention window is out of range".to_string()))?;
        let cutoff = Utc::now()
            .checked_sub_signed(window)
            .ok_or_else(|| AppError::Validation("Retention window is out of range".to_string()))?;

        let mut removed = 0usize;
        loop {
            let batch = self
                .run_storage("expire", move |db| {
                    db.pastes.expire_batch(cutoff, EXPIRY_BATCH_SIZE)
                })
                .await?;
            removed += batch;
            if batch < EXPIRY_BATCH_SIZE {
                break;
            }
        }

        if removed > 0 {
            tracing::info!(removed, "Expired old pastes");
        }
        Ok(removed)
    }
}
