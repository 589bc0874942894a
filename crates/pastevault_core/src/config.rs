//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_MAX_PASTE_SIZE, DEFAULT_PORT, DEFAULT_RETENTION_DAYS, DEFAULT_STORAGE_TIMEOUT,
    DEFAULT_SWEEP_INTERVAL, ENCRYPTION_KEY_ENV,
};
use crate::error::AppError;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// 256-bit content encryption key.
///
/// Never printed: `Debug` is redacted and parse errors do not echo input.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; 32]);

impl EncryptionKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a key from 64 hex characters.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when the value is not exactly 32 hex-encoded bytes.
    pub fn from_hex(value: &str) -> Result<Self, AppError> {
        let mut decoded = hex::decode(value.trim()).map_err(|_| {
            AppError::Config(format!("{} must be hex-encoded", ENCRYPTION_KEY_ENV))
        })?;
        let result = <[u8; 32]>::try_from(decoded.as_slice())
            .map(Self)
            .map_err(|_| {
                AppError::Config(format!(
                    "{} must decode to 32 bytes (64 hex characters)",
                    ENCRYPTION_KEY_ENV
                ))
            });
        decoded.zeroize();
        result
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

/// Runtime configuration for PasteVault.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_paste_size: usize,
    pub retention: Duration,
    pub sweep_interval: Duration,
    pub storage_timeout: Duration,
    pub encryption_key: EncryptionKey,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

/// Read a positive integer from the environment, falling back on absence.
///
/// # Errors
/// Returns [`AppError::Config`] when the variable is set but not a positive integer.
fn env_positive_u64(name: &str, default: u64) -> Result<u64, AppError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(AppError::Config(format!(
                "{} must be a positive integer, got '{}'",
                name, raw
            ))),
        },
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied for optional settings.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when `ENCRYPTION_KEY` is missing or malformed,
    /// or when a numeric setting does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        let encryption_key = match env::var(ENCRYPTION_KEY_ENV) {
            Ok(value) => EncryptionKey::from_hex(&value)?,
            Err(_) => {
                return Err(AppError::Config(format!(
                    "{} is required (64 hex characters)",
                    ENCRYPTION_KEY_ENV
                )))
            }
        };

        let port = env_positive_u64("PORT", u64::from(DEFAULT_PORT))?;
        let port = u16::try_from(port)
            .map_err(|_| AppError::Config(format!("PORT {} is out of range", port)))?;
        let max_paste_size = env_positive_u64("MAX_PASTE_SIZE", DEFAULT_MAX_PASTE_SIZE as u64)?;
        let retention_days = env_positive_u64("RETENTION_DAYS", DEFAULT_RETENTION_DAYS)?;
        let sweep_secs = env_positive_u64("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL.as_secs())?;
        let timeout_ms = env_positive_u64(
            "STORAGE_TIMEOUT_MS",
            DEFAULT_STORAGE_TIMEOUT.as_millis() as u64,
        )?;

        Ok(Self {
            db_path: env::var("DB_PATH").map(expand_tilde).unwrap_or_else(|_| {
                let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
                let cache_dir = home.join(".cache").join("pastevault");
                cache_dir.join("db").to_string_lossy().to_string()
            }),
            port,
            max_paste_size: usize::try_from(max_paste_size).unwrap_or(usize::MAX),
            retention: Duration::from_secs(retention_days.saturating_mul(24 * 60 * 60)),
            sweep_interval: Duration::from_secs(sweep_secs),
            storage_timeout: Duration::from_millis(timeout_ms),
            encryption_key,
        })
    }
}
