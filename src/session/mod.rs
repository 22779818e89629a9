//! Client-side session state.
//!
//! A session is the pair `access_token`/`userId` persisted in a key/value store.
//! It is created only by a confirmed activation (device trust gate, password
//! login, OTP verification), read by every authenticated flow, and removed on
//! logout. No expiry is enforced client-side.

mod file;
mod memory;

pub use self::file::FileStore;
pub use self::memory::MemoryStore;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, warn};

/// Store key for the bearer token.
pub const ACCESS_TOKEN: &str = "access_token";
/// Store key for the user identifier.
pub const USER_ID: &str = "userId";
/// Store key for the registered device fingerprint.
pub const DEVICE_ID: &str = "deviceId";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Durable key/value storage for session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    async fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// Active session read from the store.
#[derive(Clone, Debug)]
pub struct Session {
    pub access_token: SecretString,
    pub user_id: String,
}

impl Session {
    #[must_use]
    pub fn new(access_token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            user_id: user_id.into(),
        }
    }
}

/// Persists the session and confirms both keys read back unchanged.
///
/// Returns `Ok(false)` when the writes appeared to succeed but a stored value
/// is missing or different; callers must not treat the session as active then.
/// On a mismatch or a store error both keys are removed before returning, so a
/// half-written pair never survives as a session.
///
/// # Errors
/// Returns an error if the store rejects a write or read.
pub async fn activate(store: &dyn SessionStore, session: &Session) -> Result<bool, SessionError> {
    match write_and_confirm(store, session).await {
        Ok(true) => {
            debug!(user_id = %session.user_id, "session activated");
            Ok(true)
        }
        Ok(false) => {
            warn!(user_id = %session.user_id, "session did not read back after write");
            rollback(store).await;
            Ok(false)
        }
        Err(err) => {
            warn!(user_id = %session.user_id, "Error writing session: {err}");
            rollback(store).await;
            Err(err)
        }
    }
}

async fn write_and_confirm(store: &dyn SessionStore, session: &Session) -> Result<bool, SessionError> {
    let token = session.access_token.expose_secret();
    store.set(ACCESS_TOKEN, token).await?;
    store.set(USER_ID, &session.user_id).await?;

    let stored_token = store.get(ACCESS_TOKEN).await?;
    let stored_user = store.get(USER_ID).await?;
    Ok(stored_token.as_deref() == Some(token)
        && stored_user.as_deref() == Some(session.user_id.as_str()))
}

/// Best-effort removal of both keys; each removal is attempted on its own.
async fn rollback(store: &dyn SessionStore) {
    for key in [ACCESS_TOKEN, USER_ID] {
        if let Err(err) = store.remove(key).await {
            warn!(key, "Error rolling back session key: {err}");
        }
    }
}

/// Returns the current session when both keys are present and non-empty.
///
/// # Errors
/// Returns an error if the store cannot be read.
pub async fn current(store: &dyn SessionStore) -> Result<Option<Session>, SessionError> {
    let token = store.get(ACCESS_TOKEN).await?;
    let user_id = store.get(USER_ID).await?;

    Ok(match (token, user_id) {
        (Some(token), Some(user_id)) if !token.is_empty() && !user_id.is_empty() => {
            Some(Session::new(token, user_id))
        }
        _ => None,
    })
}

/// Removes the session keys.
///
/// # Errors
/// Returns an error if the store rejects a removal.
pub async fn clear(store: &dyn SessionStore) -> Result<(), SessionError> {
    store.remove(ACCESS_TOKEN).await?;
    store.remove(USER_ID).await?;
    Ok(())
}
