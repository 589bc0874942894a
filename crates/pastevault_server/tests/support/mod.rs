//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use pastevault_core::EncryptionKey;
use pastevault_server::{
    create_app, AppState, Config, Database, PasteCipher, PasteStore, StoreLimits,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub(crate) const TEST_MAX_PASTE_SIZE: usize = 1024;

pub(crate) fn test_key() -> EncryptionKey {
    EncryptionKey::from_bytes([0x42; 32])
}

pub(crate) fn test_config_for_db_path(db_path: &Path) -> Config {
    Config {
        port: 0,
        db_path: db_path.to_str().expect("db path").to_string(),
        max_paste_size: TEST_MAX_PASTE_SIZE,
        retention: Duration::from_secs(30 * 24 * 60 * 60),
        sweep_interval: Duration::from_secs(24 * 60 * 60),
        storage_timeout: Duration::from_secs(5),
        encryption_key: test_key(),
    }
}

pub(crate) fn store_for(config: &Config, db: Arc<Database>, key: &EncryptionKey) -> PasteStore {
    PasteStore::new(db, PasteCipher::new(key), StoreLimits::from_config(config))
}

pub(crate) fn test_server_for_store(config: Config, store: Arc<PasteStore>) -> TestServer {
    let state = AppState::new(config, store);
    let app = create_app(state, false);
    TestServer::new(app).expect("server")
}

/// Server over a fresh database, plus the store behind it for direct inspection.
pub(crate) fn setup_test_server() -> (TestServer, TempDir, Arc<PasteStore>) {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config_for_db_path(&temp_dir.path().join("db"));
    let db = Arc::new(Database::new(config.db_path.as_str()).expect("open db"));
    let store = Arc::new(store_for(&config, db, &config.encryption_key));
    let server = test_server_for_store(config, store.clone());
    (server, temp_dir, store)
}
