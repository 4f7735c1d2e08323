//! Error types for atomscope.
//!
//! Only persistence can fail. Every caller in this crate recovers from these
//! errors locally (falling back to defaults or keeping the in-memory value),
//! so they surface mainly through logging and through the storage API for
//! applications that want to react themselves.

use std::fmt;

/// Errors from a durable key/value blob store.
#[derive(Debug)]
pub enum StorageError {
    /// Failed to read or write the backing file.
    Io(std::io::Error),
    /// The store has no usable location (no home/config directory).
    NoLocation,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "Storage I/O failed: {}", e),
            StorageError::NoLocation => write!(f, "No writable storage location could be determined"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::NoLocation => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Errors that can occur while loading or saving settings.
#[derive(Debug)]
pub enum SettingsError {
    /// The underlying blob store failed.
    Storage(StorageError),
    /// The stored blob could not be (de)serialized as JSON.
    Json(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Storage(e) => write!(f, "Settings storage error: {}", e),
            SettingsError::Json(e) => write!(f, "Settings are not valid JSON: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Storage(e) => Some(e),
            SettingsError::Json(e) => Some(e),
        }
    }
}

impl From<StorageError> for SettingsError {
    fn from(e: StorageError) -> Self {
        SettingsError::Storage(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Storage(StorageError::Io(e))
    }
}
