//! Paste-related data models.

use crate::constants::{DEFAULT_LANGUAGE, MAX_LANGUAGE_LEN};
use crate::crypto::CodecError;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted paste row. `ciphertext` is the codec envelope, never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasteRecord {
    pub paste_id: String,
    pub ciphertext: Vec<u8>,
    pub language: String,
    pub views: u64,
    pub created_at: DateTime<Utc>,
}

impl PasteRecord {
    /// Build a fresh row with zero views, stamped now.
    pub fn new(paste_id: String, ciphertext: Vec<u8>, language: String) -> Self {
        Self {
            paste_id,
            ciphertext,
            language,
            views: 0,
            created_at: Utc::now(),
        }
    }
}

/// Decrypted paste returned by a counted fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPaste {
    pub content: Vec<u8>,
    pub language: String,
    pub views: u64,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a paste.
#[derive(Debug, Deserialize)]
pub struct CreatePasteRequest {
    #[serde(default)]
    pub content: String,
    pub language: Option<String>,
}

/// Response payload for a created paste.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePasteResponse {
    pub paste_id: String,
}

/// Response payload for a fetched paste.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteResponse {
    pub content: String,
    pub language: String,
    pub views: u64,
    pub created_at: DateTime<Utc>,
}

impl PasteResponse {
    /// Convert a fetched paste into the JSON shape.
    ///
    /// # Errors
    /// Returns [`AppError::CorruptEntry`] when the decrypted content is not UTF-8;
    /// every paste is created from a JSON string so this indicates a foreign row.
    pub fn from_fetched(paste_id: &str, fetched: FetchedPaste) -> Result<Self, AppError> {
        let content = String::from_utf8(fetched.content).map_err(|_| AppError::CorruptEntry {
            paste_id: paste_id.to_string(),
            source: CodecError::Format("content is not valid UTF-8".to_string()),
        })?;
        Ok(Self {
            content,
            language: fetched.language,
            views: fetched.views,
            created_at: fetched.created_at,
        })
    }
}

/// Normalize a caller-supplied language label.
///
/// Blank or missing labels become `"plaintext"`. The label is otherwise free-form.
///
/// # Errors
/// Returns [`AppError::Validation`] when the trimmed label exceeds 50 characters.
pub fn normalize_language(language: Option<&str>) -> Result<String, AppError> {
    let trimmed = language.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Ok(DEFAULT_LANGUAGE.to_string());
    }
    if trimmed.chars().count() > MAX_LANGUAGE_LEN {
        return Err(AppError::Validation(format!(
            "Language label exceeds {} characters",
            MAX_LANGUAGE_LEN
        )));
    }
    Ok(trimmed.to_string())
}
