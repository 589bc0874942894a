//! Shared constants used across PasteVault crates.

use std::time::Duration;

/// Default API port for PasteVault.
pub const DEFAULT_PORT: u16 = 3001;

/// Default maximum paste size (content bytes) accepted by the store.
pub const DEFAULT_MAX_PASTE_SIZE: usize = 1_000_000;

/// Default retention window in days.
pub const DEFAULT_RETENTION_DAYS: u64 = 30;

/// Default period between expiry sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default upper bound for a single storage call.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Random bytes drawn per public paste id (hex-encoded to twice as many chars).
pub const PASTE_ID_BYTES: usize = 6;

/// Length of a public paste id in characters.
pub const PASTE_ID_LEN: usize = PASTE_ID_BYTES * 2;

/// Allocation attempts before `create` gives up on id collisions.
pub const MAX_ID_ALLOCATION_ATTEMPTS: usize = 5;

/// Language label stored when the caller supplies none.
pub const DEFAULT_LANGUAGE: &str = "plaintext";

/// Longest accepted language label, in characters.
pub const MAX_LANGUAGE_LEN: usize = 50;

/// Rows removed per expiry write transaction.
pub const EXPIRY_BATCH_SIZE: usize = 512;

/// Environment variable carrying the hex-encoded content key.
pub const ENCRYPTION_KEY_ENV: &str = "ENCRYPTION_KEY";
