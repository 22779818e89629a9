//! # Trustgate (Device-Gated Session Handshake)
//!
//! `trustgate` activates client sessions for a KYC / anti-fraud product only on
//! devices the auth server has already registered.
//!
//! ## Device Trust Gate
//!
//! An out-of-band authentication step (for example an OAuth redirect) lands the
//! client on a URL carrying `access_token`, `userId` and `deviceIds`. The gate:
//!
//! 1. Computes the local device fingerprint through a [`fingerprint::FingerprintProvider`].
//! 2. Decodes `deviceIds` (URL-encoded JSON array). Malformed or missing lists are empty.
//! 3. Activates the session only when the fingerprint is in the list, and navigates
//!    to the landing route only after the stored token reads back intact.
//!
//! A session is never activated from URL-supplied credentials on a device that is
//! not in the allow-list carried by the same URL.
//!
//! ## Password Login (OTP step-up)
//!
//! Password login reports `loggedIn: false` for unknown devices. The client then
//! verifies an OTP sent to the user, which registers the device and returns the
//! same `access_token`/`userId` pair the gate activates.
//!
//! All collaborators (fingerprint, session store, navigation, notifications) are
//! injected so the flows run without a browser.

pub mod auth;
pub mod cli;
pub mod fingerprint;
pub mod gate;
pub mod navigate;
pub mod notify;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
