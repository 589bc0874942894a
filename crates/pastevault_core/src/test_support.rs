//! Shared test-only helpers for pastevault_core.

use crate::models::paste::PasteRecord;
use crate::{Database, EncryptionKey, PasteCipher};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().expect("db path")).expect("db");
    (db, temp_dir)
}

/// Deterministic key for tests.
pub(crate) fn test_key() -> EncryptionKey {
    EncryptionKey::from_bytes([0x42; 32])
}

pub(crate) fn test_cipher() -> PasteCipher {
    PasteCipher::new(&test_key())
}

/// Build a row with an explicit creation time, sealed under [`test_key`].
pub(crate) fn record_created_at(
    paste_id: &str,
    content: &str,
    created_at: DateTime<Utc>,
) -> PasteRecord {
    let ciphertext = test_cipher()
        .encrypt(content.as_bytes())
        .expect("encrypt");
    let mut record = PasteRecord::new(paste_id.to_string(), ciphertext, "plaintext".to_string());
    record.created_at = created_at;
    record
}

/// Build a row stamped now.
pub(crate) fn record(paste_id: &str, content: &str) -> PasteRecord {
    record_created_at(paste_id, content, Utc::now())
}

fn config_env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn apply_env(key: &str, value: Option<&str>) {
    // SAFETY: only called while `config_env_lock` is held.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Puts saved variables back even when the check panics.
struct RestoreEnv(Vec<(String, Option<String>)>);

impl Drop for RestoreEnv {
    fn drop(&mut self) {
        for (key, previous) in self.0.iter().rev() {
            apply_env(key, previous.as_deref());
        }
    }
}

/// Run `check` with configuration variables set (`Some`) or cleared (`None`).
///
/// Calls are serialized, and every listed variable is restored afterwards.
pub(crate) fn with_config_env<R>(vars: &[(&str, Option<&str>)], check: impl FnOnce() -> R) -> R {
    let _lock = config_env_lock()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let _restore = RestoreEnv(
        vars.iter()
            .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
            .collect(),
    );
    for (key, value) in vars {
        apply_env(key, *value);
    }
    check()
}

mod tests {
    use super::with_config_env;

    #[test]
    fn config_env_is_restored_after_check() {
        let key = "PASTEVAULT_TEST_RESTORE";
        with_config_env(&[(key, Some("set"))], || {
            assert_eq!(std::env::var(key).ok().as_deref(), Some("set"));
        });
        assert!(std::env::var(key).is_err());
    }

    #[test]
    fn config_env_is_restored_when_check_panics() {
        let key = "PASTEVAULT_TEST_RESTORE_PANIC";
        let outcome = std::panic::catch_unwind(|| {
            with_config_env(&[(key, Some("set"))], || panic!("check failed"))
        });
        assert!(outcome.is_err());
        assert!(std::env::var(key).is_err());
    }
}
