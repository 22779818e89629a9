//! Device Trust Gate.
//!
//! Flow Overview:
//! 1) Read `access_token`, `userId` and `deviceIds` from the landing URL. Without
//!    the first two the gate is inert.
//! 2) Await the local device fingerprint.
//! 3) Decode the allow-list; malformed or missing lists are empty.
//! 4) Fingerprint not listed: notify and redirect to login, store untouched.
//! 5) Fingerprint listed: write the session, read both keys back, then redirect
//!    to the landing route. A failed write or read-back removes both keys and
//!    redirects to login instead.
//!
//! Security boundaries: `deviceIds` is attacker-visible and attacker-editable.
//! It only narrows trust (an empty or broken list rejects); the bearer token is
//! still validated by the API on every authenticated call.

mod allow_list;
mod params;

pub use self::allow_list::AllowList;
pub use self::params::{HandshakeParams, PARAM_ACCESS_TOKEN, PARAM_DEVICE_IDS, PARAM_USER_ID};

use crate::{
    fingerprint::FingerprintProvider,
    navigate::{Navigator, Route},
    notify::{Notification, Notifier},
    session::{self, Session, SessionStore},
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// What to do when the fingerprint cannot be computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FingerprintFailure {
    /// Log and leave the client where it is; no session, no redirect.
    #[default]
    Stay,
    /// Handle like an unregistered device: notify and redirect to login.
    Reject,
}

/// Routing and failure policy for the gate.
#[derive(Clone, Debug)]
pub struct GatePolicy {
    pub landing: Route,
    pub login: Route,
    pub on_fingerprint_error: FingerprintFailure,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            landing: Route::Dashboard,
            login: Route::Login,
            on_fingerprint_error: FingerprintFailure::Stay,
        }
    }
}

/// Result of one gate run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateOutcome {
    /// No handshake parameters; nothing happened.
    Inert,
    /// Fingerprint unavailable and the policy is to stay put.
    Aborted,
    /// Device not in the allow-list (or fingerprint unavailable under `Reject`).
    Rejected,
    /// Device matched but the session did not persist; redirected to login.
    StoreUnconfirmed,
    /// Session active; redirected to the landing route.
    Activated { user_id: String },
}

impl GateOutcome {
    #[must_use]
    pub fn is_activated(&self) -> bool {
        matches!(self, Self::Activated { .. })
    }
}

/// Decides whether URL-delivered credentials may become a local session.
pub struct DeviceTrustGate {
    fingerprint: Arc<dyn FingerprintProvider>,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    policy: GatePolicy,
}

impl DeviceTrustGate {
    pub fn new(
        fingerprint: Arc<dyn FingerprintProvider>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            fingerprint,
            store,
            navigator,
            notifier,
            policy: GatePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: GatePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    /// Runs the gate against a landing URL.
    #[instrument(skip_all, fields(path = %url.path()))]
    pub async fn run(&self, url: &Url) -> GateOutcome {
        match HandshakeParams::from_url(url) {
            Some(params) => self.run_params(params).await,
            None => {
                debug!("no handshake parameters, gate inert");
                GateOutcome::Inert
            }
        }
    }

    /// Runs the gate against already extracted handshake parameters.
    #[instrument(skip_all, fields(user_id = %params.user_id))]
    pub async fn run_params(&self, params: HandshakeParams) -> GateOutcome {
        let fingerprint = match self.fingerprint.visitor_id().await {
            Ok(fingerprint) => fingerprint,
            Err(err) => {
                error!("Fingerprint generation error: {err}");
                return match self.policy.on_fingerprint_error {
                    FingerprintFailure::Stay => GateOutcome::Aborted,
                    FingerprintFailure::Reject => self.reject(),
                };
            }
        };

        let allow_list = AllowList::decode(params.device_ids.as_deref());
        debug!(
            fingerprint = %fingerprint,
            allowed = allow_list.len(),
            "checking device against allow-list"
        );

        if !allow_list.contains(&fingerprint) {
            warn!("device not registered for user");
            return self.reject();
        }

        let session = Session {
            access_token: params.access_token,
            user_id: params.user_id,
        };

        match session::activate(self.store.as_ref(), &session).await {
            Ok(true) => {
                info!(landing = %self.policy.landing, "device trusted, session activated");
                self.navigator.navigate(&self.policy.landing);
                GateOutcome::Activated {
                    user_id: session.user_id,
                }
            }
            Ok(false) => {
                self.navigator.navigate(&self.policy.login);
                GateOutcome::StoreUnconfirmed
            }
            Err(err) => {
                error!("Failed to persist session: {err}");
                self.navigator.navigate(&self.policy.login);
                GateOutcome::StoreUnconfirmed
            }
        }
    }

    fn reject(&self) -> GateOutcome {
        self.notifier.notify(Notification::device_not_registered());
        self.navigator.navigate(&self.policy.login);
        GateOutcome::Rejected
    }
}

impl std::fmt::Debug for DeviceTrustGate {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("DeviceTrustGate")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
