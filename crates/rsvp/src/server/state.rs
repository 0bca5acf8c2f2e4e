//! Shared handler state.

use std::fmt;
use std::sync::{Arc, Mutex};

use axum::http::HeaderValue;
use tracing::warn;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::Storage;

use super::error::ApiError;

/// State cloned into every handler.
///
/// The single database connection sits behind a mutex and is only touched
/// from tokio's blocking pool.
#[derive(Clone)]
pub struct AppState {
    storage: Arc<Mutex<Storage>>,
    admin_digest: Option<blake3::Hash>,
    event_name: Arc<str>,
    content_security_policy: Option<HeaderValue>,
}

impl AppState {
    /// Build state from an open store and the loaded configuration.
    #[must_use]
    pub fn new(storage: Storage, config: &Config) -> Self {
        let csp = config.content_security_policy();
        let content_security_policy = if csp.is_empty() {
            None
        } else {
            HeaderValue::from_str(&csp)
                .map_err(|e| warn!("Ignoring unusable Content-Security-Policy {:?}: {}", csp, e))
                .ok()
        };

        Self {
            storage: Arc::new(Mutex::new(storage)),
            admin_digest: config
                .admin
                .password()
                .map(|p| blake3::hash(p.as_bytes())),
            event_name: Arc::from(config.event.name.as_str()),
            content_security_policy,
        }
    }

    /// Event name for exports and confirmations.
    #[must_use]
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// `Content-Security-Policy` value added to every response, if any.
    #[must_use]
    pub fn content_security_policy(&self) -> Option<&HeaderValue> {
        self.content_security_policy.as_ref()
    }

    /// Whether an admin password is configured.
    #[must_use]
    pub fn admin_enabled(&self) -> bool {
        self.admin_digest.is_some()
    }

    /// Check a candidate admin password.
    ///
    /// Both sides are hashed and compared digest to digest, which
    /// `blake3::Hash` does in constant time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AdminDisabled`] when no password is configured and
    /// [`Error::InvalidPassword`] on mismatch.
    pub fn check_password(&self, candidate: &str) -> Result<()> {
        let expected = self.admin_digest.ok_or(Error::AdminDisabled)?;
        if blake3::hash(candidate.as_bytes()) == expected {
            Ok(())
        } else {
            Err(Error::InvalidPassword)
        }
    }

    /// Run `f` against the store on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or an internal error if the task
    /// panicked or the lock is poisoned.
    pub async fn with_storage<T, F>(&self, f: F) -> std::result::Result<T, ApiError>
    where
        F: FnOnce(&mut Storage) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        let outcome = tokio::task::spawn_blocking(move || {
            let mut guard = storage
                .lock()
                .map_err(|_| Error::internal("storage lock poisoned"))?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| Error::internal(format!("storage task failed: {e}")))?;

        outcome.map_err(ApiError::from)
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("admin_enabled", &self.admin_enabled())
            .field("event_name", &self.event_name)
            .finish_non_exhaustive()
    }
}
