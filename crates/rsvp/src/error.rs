//! Error types for the RSVP service.
//!
//! This module defines all error types used throughout the crate, providing
//! enough context for logging while keeping messages fit to show a guest.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for RSVP operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
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

    // === Domain Errors ===
    /// Submitted data failed validation.
    ///
    /// Carries every problem found, in form order.
    #[error("{}", .problems.join("; "))]
    Validation {
        /// One message per failed rule.
        problems: Vec<String>,
    },

    /// The requested record does not exist.
    #[error("{what} not found")]
    NotFound {
        /// What was looked up, e.g. `invitation 42`.
        what: String,
    },

    /// A record with the same identity already exists.
    #[error("{what} already exists")]
    Conflict {
        /// What collided.
        what: String,
    },

    // === Admin Errors ===
    /// The supplied admin password did not match.
    #[error("Invalid password")]
    InvalidPassword,

    /// The password sent with a setup request did not match.
    #[error("Invalid admin password")]
    InvalidAdminPassword,

    /// No admin password is configured, so admin access is disabled.
    #[error("Admin access is not configured")]
    AdminDisabled,

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for RSVP operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a validation error from a single message.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            problems: vec![message.into()],
        }
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a conflict error.
    #[must_use]
    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict { what: what.into() }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means a record was missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is caused by bad input rather than the server.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::NotFound { .. }
                | Self::Conflict { .. }
                | Self::InvalidPassword
                | Self::InvalidAdminPassword
        )
    }
}
