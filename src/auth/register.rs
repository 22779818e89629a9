//! Account registration bound to the registering device.

use super::{types::RegisterRequest, AuthContext, AuthError};
use crate::{
    navigate::Route,
    session::{self, Session, DEVICE_ID},
};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Clone, Debug)]
pub struct Registration {
    pub email: String,
    pub password: SecretString,
    pub username: String,
    pub bank_account: String,
}

/// Server verdict on a registration attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered { message: String },
    DeviceAlreadyRegistered,
    EmailInUse,
    UsernameInUse,
}

impl RegisterOutcome {
    /// Classifies the server `message`; registration errors arrive with 2xx.
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        if message.contains("E11000 duplicate key error") && message.contains("deviceId") {
            Self::DeviceAlreadyRegistered
        } else if message.contains("Email is already in use") {
            Self::EmailInUse
        } else if message.contains("Username is already in use") {
            Self::UsernameInUse
        } else {
            Self::Registered {
                message: message.to_string(),
            }
        }
    }

    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Registered { message } => message,
            Self::DeviceAlreadyRegistered => {
                "This device is already registered. Please log in instead."
            }
            Self::EmailInUse => "Email is already in use. Please use a different email.",
            Self::UsernameInUse => {
                "Username is already in use. Please choose a different username."
            }
        }
    }
}

/// Basic email format check.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").is_ok_and(|regex| regex.is_match(email))
}

/// At least eight characters with one uppercase letter and one digit.
#[must_use]
pub fn validate_password(password: &str) -> bool {
    let has_upper = Regex::new(r"[A-Z]").is_ok_and(|regex| regex.is_match(password));
    let has_digit = Regex::new(r"\d").is_ok_and(|regex| regex.is_match(password));
    password.chars().count() >= MIN_PASSWORD_CHARS && has_upper && has_digit
}

/// Validates the form, registers the account with this device and, on success,
/// stores the returned credentials and device id before routing to login.
///
/// # Errors
/// Returns a validation error before any request is made, or the transport,
/// fingerprint or store error that stopped the registration.
#[instrument(skip_all)]
pub async fn register(
    ctx: &AuthContext,
    registration: Registration,
) -> Result<RegisterOutcome, AuthError> {
    let email = registration.email.trim().to_string();
    if !validate_email(&email) {
        return Err(AuthError::Validation("Invalid email format!".to_string()));
    }
    if !validate_password(registration.password.expose_secret()) {
        return Err(AuthError::Validation(
            "Password must be at least 8 characters long, contain at least one uppercase letter and one number."
                .to_string(),
        ));
    }

    let device_id = ctx.fingerprint.visitor_id().await.map_err(|err| {
        warn!("Error getting fingerprint: {err}");
        AuthError::Validation("Device identification failed. Please try again.".to_string())
    })?;

    let response = ctx
        .client
        .register(&RegisterRequest {
            email,
            password: registration.password,
            username: registration.username.trim().to_string(),
            bank_account: registration.bank_account.trim().to_string(),
            device_id: device_id.to_string(),
        })
        .await?;

    let outcome = RegisterOutcome::from_message(&response.message);
    if !matches!(outcome, RegisterOutcome::Registered { .. }) {
        info!(?outcome, "registration refused");
        return Ok(outcome);
    }

    if let (Some(access_token), Some(user_id)) = (response.access_token, response.user_id) {
        let session = Session {
            access_token,
            user_id,
        };
        if !session::activate(ctx.store.as_ref(), &session).await? {
            warn!("registration session did not persist");
        }
    }
    ctx.store.set(DEVICE_ID, device_id.as_str()).await?;

    info!("account registered");
    ctx.navigator.navigate(&Route::Login);
    Ok(outcome)
}
