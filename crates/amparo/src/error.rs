//! Error types for amparo.
//!
//! This module defines the error taxonomy shared by the flag store, the
//! setup gate, the form rules and the configuration layer.

use std::path::PathBuf;
use thiserror::Error;

use crate::forms::FormError;

/// The main error type for amparo operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Flag Store Errors ===
    /// A persisted flag could not be read or written.
    #[error("flag storage unavailable for '{key}': {message}")]
    StorageUnavailable {
        /// Store key of the flag involved.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Setup Errors ===
    /// The setup wizard cannot be finished yet.
    #[error("setup incomplete: {missing} is required before continuing")]
    SetupIncomplete {
        /// The required step that has not been recorded.
        missing: &'static str,
    },

    /// Form input failed validation.
    #[error("invalid form input: {0}")]
    Form(#[from] FormError),

    // === Viewport Errors ===
    /// Viewport dimensions are unusable for scaling.
    #[error("invalid viewport {width}x{height}: dimensions must be finite and positive")]
    InvalidViewport {
        /// Reported width in logical pixels.
        width: f64,
        /// Reported height in logical pixels.
        height: f64,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for amparo operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a storage-unavailable error for the given key.
    #[must_use]
    pub fn storage_unavailable(key: impl Into<String>, message: impl ToString) -> Self {
        Self::StorageUnavailable {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error came from the flag store or its database.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable { .. }
                | Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
        )
    }

    /// Check if this error is a rejected form submission.
    #[must_use]
    pub fn is_form_error(&self) -> bool {
        matches!(self, Self::Form(_))
    }
}
