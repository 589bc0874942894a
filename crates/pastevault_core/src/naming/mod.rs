//! Public paste identifiers.
//!
//! Ids are 6 bytes from the OS random source rendered as 12 lowercase hex
//! characters. Allocation does not check storage; the insert path rejects
//! duplicates.

use crate::constants::{PASTE_ID_BYTES, PASTE_ID_LEN};
use crate::error::AppError;
use rand::{rngs::OsRng, RngCore};

/// Source of candidate public paste ids.
pub trait IdAllocator: Send + Sync {
    /// Produce one candidate id.
    ///
    /// # Errors
    /// Returns [`AppError::Entropy`] when the random source is unavailable.
    fn allocate(&self) -> Result<String, AppError>;
}

/// Allocator backed by the operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdAllocator;

impl IdAllocator for RandomIdAllocator {
    fn allocate(&self) -> Result<String, AppError> {
        generate_paste_id()
    }
}

/// Generate a random 12-character hex paste id.
///
/// # Errors
/// Returns [`AppError::Entropy`] if the OS random source fails. There is no
/// fallback to a weaker generator.
pub fn generate_paste_id() -> Result<String, AppError> {
    let mut bytes = [0u8; PASTE_ID_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| AppError::Entropy(err.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Whether `id` has the shape of an allocated paste id.
pub fn is_valid_paste_id(id: &str) -> bool {
    id.len() == PASTE_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_twelve_lowercase_hex_chars() {
        for _ in 0..64 {
            let id = RandomIdAllocator.allocate().expect("allocate");
            assert_eq!(id.len(), 12);
            assert!(is_valid_paste_id(&id), "unexpected id shape: {}", id);
        }
    }

    #[test]
    fn generated_ids_do_not_repeat_in_practice() {
        let ids: HashSet<String> = (0..10_000)
            .map(|_| generate_paste_id().expect("allocate"))
            .collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn id_shape_check_rejects_foreign_values() {
        assert!(is_valid_paste_id("abc123def456"));
        assert!(!is_valid_paste_id("nonexistent"));
        assert!(!is_valid_paste_id("ABC123DEF456"));
        assert!(!is_valid_paste_id("abc123def45"));
        assert!(!is_valid_paste_id("abc123def4567"));
        assert!(!is_valid_paste_id("../etc/passw"));
    }
}
