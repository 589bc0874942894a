//! Shared database time conversion helpers.

use chrono::{DateTime, Utc};

/// Index key component for a creation timestamp.
///
/// Pre-epoch timestamps clamp to zero to avoid negative->u64 underflow; they
/// still sort before every real row and so remain expirable.
pub(crate) fn created_millis_key(created_at: DateTime<Utc>) -> u64 {
    created_at.timestamp_millis().max(0) as u64
}
