//! Auth server flows that create, refresh and destroy the client session.
//!
//! Flow Overview:
//! 1) Password login posts the device fingerprint with the credentials.
//! 2) Unknown devices get `loggedIn: false`; the user submits the emailed OTP,
//!    which registers the device and returns a session.
//! 3) Every session is activated through [`session::activate`], the same
//!    write-then-read-back contract the device trust gate uses.
//! 4) Authenticated views hydrate the user profile, rotating the stored token and
//!    routing unverified users to KYC.
//! 5) Logout removes the session keys locally.
//!
//! Passwords and OTPs stay in `SecretString` and are never logged. Servers that
//! expect passphrase-encrypted passwords get them through [`PasswordCipher`].

mod cipher;
mod client;
mod guard;
mod login;
mod recovery;
mod register;
pub mod types;

pub use self::cipher::PasswordCipher;
pub use self::client::{AuthClient, DEFAULT_TIMEOUT};
pub use self::guard::{hydrate, Hydrated};
pub use self::login::{LoginFlow, LoginState};
pub use self::recovery::{PasswordRecovery, RecoveryOutcome, RecoveryStep};
pub use self::register::{
    register, validate_email, validate_password, RegisterOutcome, Registration,
};

use crate::{
    fingerprint::{FingerprintError, FingerprintProvider},
    gate::{DeviceTrustGate, GatePolicy},
    navigate::{Navigator, Route},
    notify::{Notification, Notifier},
    session::{self, Session, SessionError, SessionStore},
};
use std::{fmt, sync::Arc};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {}", .message.as_deref().unwrap_or("Request failed."))]
    Http { status: u16, message: Option<String> },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("{0}")]
    Validation(String),
    #[error("User not logged in.")]
    NotLoggedIn,
    #[error("Session could not be confirmed after login.")]
    SessionUnconfirmed,
    #[error("Invalid flow state: {0}")]
    InvalidState(&'static str),
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AuthError {
    /// Message for the user: the server's own message when it sent one.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Http {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Http { message: None, .. } | Self::Network(_) | Self::Parse(_) => {
                fallback.to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Collaborators shared by every auth flow.
#[derive(Clone)]
pub struct AuthContext {
    pub client: AuthClient,
    pub store: Arc<dyn SessionStore>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
    pub fingerprint: Arc<dyn FingerprintProvider>,
    /// Route opened after a session is activated.
    pub landing: Route,
}

impl AuthContext {
    pub fn new(
        client: AuthClient,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        fingerprint: Arc<dyn FingerprintProvider>,
    ) -> Self {
        Self {
            client,
            store,
            navigator,
            notifier,
            fingerprint,
            landing: Route::Dashboard,
        }
    }

    #[must_use]
    pub fn with_landing(mut self, landing: Route) -> Self {
        self.landing = landing;
        self
    }

    /// Device trust gate wired to the same collaborators.
    #[must_use]
    pub fn device_gate(&self, policy: GatePolicy) -> DeviceTrustGate {
        DeviceTrustGate::new(
            self.fingerprint.clone(),
            self.store.clone(),
            self.navigator.clone(),
            self.notifier.clone(),
        )
        .with_policy(GatePolicy {
            landing: self.landing.clone(),
            ..policy
        })
    }

    /// Activates a server-issued session and opens the landing route.
    ///
    /// A session that does not read back redirects to login instead.
    pub(crate) async fn activate_and_land(&self, session: &Session) -> Result<(), AuthError> {
        if session::activate(self.store.as_ref(), session).await? {
            self.navigator.navigate(&self.landing);
            Ok(())
        } else {
            self.navigator.navigate(&Route::Login);
            Err(AuthError::SessionUnconfirmed)
        }
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthContext")
            .field("client", &self.client)
            .field("landing", &self.landing)
            .finish_non_exhaustive()
    }
}

/// Builds a session from a server response, rejecting missing fields.
pub(crate) fn session_from_parts(
    token: Option<secrecy::SecretString>,
    user_id: Option<String>,
) -> Result<Session, AuthError> {
    match (token, user_id.filter(|id| !id.is_empty())) {
        (Some(access_token), Some(user_id)) => Ok(Session {
            access_token,
            user_id,
        }),
        _ => Err(AuthError::Parse(
            "response is missing access_token or userId".to_string(),
        )),
    }
}

/// Removes the local session, shows a toast and returns to login.
///
/// # Errors
/// Returns an error if the session store rejects the removal.
pub async fn logout(ctx: &AuthContext) -> Result<(), AuthError> {
    if let Err(err) = session::clear(ctx.store.as_ref()).await {
        warn!("Failed to clear session: {err}");
        return Err(err.into());
    }

    info!("session cleared");
    ctx.notifier.notify(Notification::logged_out());
    ctx.navigator.navigate(&Route::Login);
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::fixture;
    use super::*;
    use crate::fingerprint::StaticFingerprint;
    use crate::session::{ACCESS_TOKEN, DEVICE_ID, USER_ID};

    #[tokio::test]
    async fn logout_clears_session_and_notifies() {
        let f = fixture("http://127.0.0.1:9", StaticFingerprint::new("fp-123"));
        f.store.set(ACCESS_TOKEN, "abc").await.unwrap();
        f.store.set(USER_ID, "u1").await.unwrap();
        f.store.set(DEVICE_ID, "fp-123").await.unwrap();

        logout(&f.ctx).await.unwrap();

        assert!(f.store.get(ACCESS_TOKEN).await.unwrap().is_none());
        assert!(f.store.get(USER_ID).await.unwrap().is_none());
        assert_eq!(f.notifier.notifications(), vec![Notification::logged_out()]);
        assert_eq!(f.navigator.routes(), vec![Route::Login]);
    }

    #[test]
    fn user_message_prefers_server_text() {
        let err = AuthError::Http {
            status: 401,
            message: Some("Invalid credentials".to_string()),
        };
        assert_eq!(err.user_message("Something went wrong"), "Invalid credentials");

        let err = AuthError::Http {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message("Something went wrong"), "Something went wrong");
        assert_eq!(
            AuthError::NotLoggedIn.user_message("fallback"),
            "User not logged in."
        );
    }

    #[test]
    fn session_from_parts_requires_both_fields() {
        let token = || Some(secrecy::SecretString::from("abc".to_string()));
        assert!(session_from_parts(token(), Some("u1".to_string())).is_ok());
        assert!(session_from_parts(token(), None).is_err());
        assert!(session_from_parts(token(), Some(String::new())).is_err());
        assert!(session_from_parts(None, Some("u1".to_string())).is_err());
    }

    #[tokio::test]
    async fn device_gate_uses_context_landing() {
        let f = fixture("http://127.0.0.1:9", StaticFingerprint::new("fp-123"));
        let ctx = f.ctx.clone().with_landing(Route::Other("/home".to_string()));
        let gate = ctx.device_gate(GatePolicy::default());
        assert_eq!(gate.policy().landing, Route::Other("/home".to_string()));
    }
}
