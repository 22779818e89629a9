//! Device fingerprint collaborator.
//!
//! The fingerprint is an opaque `visitorId` computed by a third-party library on
//! the client device. Only its stability matters here: the same device and
//! browser installation should yield the same value across sessions. The
//! algorithm itself stays outside this crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("fingerprint unavailable: {0}")]
    Unavailable(String),
    #[error("fingerprint is empty")]
    Empty,
    #[error("fingerprint has surrounding whitespace")]
    Whitespace,
}

/// Stable per-device identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wraps a visitor id exactly as computed.
    ///
    /// Values are never normalised: allow-list membership is an exact match.
    ///
    /// # Errors
    /// Returns [`FingerprintError::Empty`] when the value is blank and
    /// [`FingerprintError::Whitespace`] when it has leading or trailing
    /// whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, FingerprintError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(FingerprintError::Empty);
        }
        if value.trim() != value {
            return Err(FingerprintError::Whitespace);
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Computes the local device fingerprint.
///
/// Covers the library's `load()` then `get()` sequence as a single suspend point;
/// callers must await it before making any trust decision.
#[async_trait]
pub trait FingerprintProvider: Send + Sync {
    async fn visitor_id(&self) -> Result<Fingerprint, FingerprintError>;
}

/// Provider returning a fingerprint computed elsewhere (e.g. handed over by the
/// browser that completed the redirect).
#[derive(Clone, Debug)]
pub struct StaticFingerprint {
    value: Option<String>,
}

impl StaticFingerprint {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }

    /// Provider that always fails, as when the browser blocks fingerprinting.
    #[must_use]
    pub fn unavailable() -> Self {
        Self { value: None }
    }
}

#[async_trait]
impl FingerprintProvider for StaticFingerprint {
    async fn visitor_id(&self) -> Result<Fingerprint, FingerprintError> {
        match &self.value {
            Some(value) => Fingerprint::new(value.as_str()),
            None => Err(FingerprintError::Unavailable(
                "fingerprinting blocked or not configured".to_string(),
            )),
        }
    }
}
