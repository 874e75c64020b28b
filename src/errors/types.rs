//! Error type definitions for the StockLens application
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that makes debugging and error
//! handling more straightforward.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all possible errors that can occur in the application.
/// It uses `thiserror` to provide automatic error trait implementations and
/// proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Spreadsheet ingestion errors
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Cache persistence layer errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Scan capture errors
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with code {code}")]
    NotFound { resource: String, code: String },

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Spreadsheet ingestion specific errors
///
/// Per-row anomalies (unparseable numbers, rows without identifying data)
/// are never errors; the normalizer recovers them locally. These variants
/// only cover a structurally unusable input table.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The table has no header row to map columns from
    #[error("Missing header row in {source_name}")]
    MissingHeader { source_name: String },

    /// The byte stream could not be read as tabular data at all
    #[error("Parse error: {0}")]
    Parse(#[from] csv::Error),
}

/// Cache persistence layer specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing store refused a write for lack of space
    #[error("Storage capacity exceeded writing key '{key}'")]
    CapacityExceeded { key: String },

    /// Entry envelope serialization/deserialization failures
    #[error("Serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// Filesystem failures from the file-backed store
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Scan capture specific errors
///
/// A source running dry is not an error; the handle just stops yielding
/// codes. Only the one-shot acquisition itself can fail.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The capture device/source could not be acquired
    #[error("Capture acquisition failed: {message}")]
    AcquisitionFailed { message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error with a custom message
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found<R: Into<String>, C: Into<String>>(resource: R, code: C) -> Self {
        Self::NotFound {
            resource: resource.into(),
            code: code.into(),
        }
    }
}

impl IngestError {
    /// Create a missing header error
    pub fn missing_header<S: Into<String>>(source_name: S) -> Self {
        Self::MissingHeader {
            source_name: source_name.into(),
        }
    }
}

impl StorageError {
    /// Create a capacity exceeded error for a given key
    pub fn capacity_exceeded<K: Into<String>>(key: K) -> Self {
        Self::CapacityExceeded { key: key.into() }
    }

    /// Whether this error should flip the artifact cache into degraded mode
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }
}

impl CaptureError {
    /// Create an acquisition failed error
    pub fn acquisition_failed<M: Into<String>>(message: M) -> Self {
        Self::AcquisitionFailed {
            message: message.into(),
        }
    }
}
