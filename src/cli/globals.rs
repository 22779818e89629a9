use crate::{
    auth::{AuthClient, AuthContext, PasswordCipher},
    fingerprint::{FingerprintProvider, StaticFingerprint},
    navigate::{Route, TracingNavigator},
    notify::TracingNotifier,
    session::FileStore,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc};

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub session_file: PathBuf,
    pub fingerprint: Option<String>,
    pub landing: Route,
    /// Enables password encryption for login and registration when set.
    pub password_passphrase: Option<SecretString>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, session_file: PathBuf) -> Self {
        Self {
            api_url,
            session_file,
            fingerprint: None,
            landing: Route::Dashboard,
            password_passphrase: None,
        }
    }

    /// Wires the auth flows to the session file, log-based navigation and the
    /// configured device fingerprint.
    ///
    /// # Errors
    /// Returns an error if the API base URL or the password passphrase is invalid.
    pub fn context(&self) -> Result<AuthContext> {
        let mut client =
            AuthClient::new(&self.api_url).context("invalid TRUSTGATE_API_BASE_URL")?;
        if let Some(passphrase) = &self.password_passphrase {
            let cipher = PasswordCipher::new(passphrase.clone())
                .context("invalid TRUSTGATE_PASSWORD_PASSPHRASE")?;
            client = client.with_password_cipher(cipher);
        }

        let fingerprint: Arc<dyn FingerprintProvider> = match &self.fingerprint {
            Some(value) => Arc::new(StaticFingerprint::new(value.clone())),
            None => Arc::new(StaticFingerprint::unavailable()),
        };

        Ok(AuthContext::new(
            client,
            Arc::new(FileStore::new(self.session_file.clone())),
            Arc::new(TracingNavigator),
            Arc::new(TracingNotifier),
            fingerprint,
        )
        .with_landing(self.landing.clone()))
    }
}
