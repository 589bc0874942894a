//! Domain models shared by storage and API layers.

/// Paste records, payloads, and language normalization.
pub mod paste;
