//! Database layer for PasteVault.

/// Paste storage helpers.
pub mod paste;
/// redb table definitions.
pub mod tables;
mod time_util;

use crate::error::AppError;
use std::path::Path;
use std::sync::Arc;

/// Database handle with access to the paste tables.
///
/// One instance is opened per process; additional handles for other
/// subsystems come from [`Database::share`] instead of reopening the file.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub pastes: paste::PasteDb,
}

impl Database {
    /// Open (or create) the database under `path` and initialize tables.
    ///
    /// `path` is a directory; the redb file lives at `<path>/data.redb`.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns [`AppError::StorageUnavailable`] when the directory cannot be
    /// prepared or another process holds the database, and a storage error when
    /// table initialization fails.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let root = Path::new(path);
        std::fs::create_dir_all(root).map_err(|err| {
            AppError::StorageUnavailable(format!(
                "Failed to prepare database directory '{}': {}",
                root.display(),
                err
            ))
        })?;

        let file = root.join(tables::REDB_FILE_NAME);
        let db = match redb::Database::create(&file) {
            Ok(db) => Arc::new(db),
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(AppError::StorageUnavailable(format!(
                    "Database '{}' is already open in another process.\n\
                    Stop the other PasteVault instance, or set DB_PATH to a different location.",
                    file.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };

        tracing::debug!("Opened paste database at {}", file.display());
        Self::from_shared(db)
    }

    /// Build a database handle from an existing shared redb instance.
    ///
    /// # Errors
    /// Returns an error if the required tables cannot be created.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            pastes: paste::PasteDb::new(db.clone())?,
            db,
        })
    }

    /// Clone this handle for another subsystem in the same process.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn share(&self) -> Result<Self, AppError> {
        Self::from_shared(self.db.clone())
    }
}

#[cfg(test)]
mod tests;
