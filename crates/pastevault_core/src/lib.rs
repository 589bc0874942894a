//! Core domain library for PasteVault (config, codec, storage, expiry).
//!
//! # Process-wide resources
//! A process owns exactly one [`Database`] and at most one running
//! [`sweeper::Sweeper`]. The database must be opened before the store or the
//! sweeper is constructed; both only hold shared handles to it. On shutdown the
//! caller stops accepting requests first, then awaits
//! [`sweeper::SweeperHandle::shutdown`] so an in-flight sweep finishes, and
//! only then drops the last [`Database`] handle.

/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Authenticated encryption of paste content at rest.
pub mod crypto;
/// Database access layer (redb tables and row operations).
pub mod db;
/// Application error types (storage/domain).
pub mod error;
/// Data models for API requests and persistence.
pub mod models;
/// Public paste identifier allocation.
pub mod naming;
/// Async paste store facade used by request handlers.
pub mod store;
/// Scheduled expiry of old pastes.
pub mod sweeper;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{Config, EncryptionKey};
pub use constants::*;
pub use crypto::{CodecError, PasteCipher};
pub use db::Database;
pub use error::AppError;
pub use naming::{IdAllocator, RandomIdAllocator};
pub use store::{PasteStore, StoreLimits};
pub use sweeper::{SweepSchedule, SweepTarget, Sweeper, SweeperHandle};
