use super::{
    types::{ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, VerifyOtpRequest},
    session_from_parts, validate_password, AuthContext, AuthError,
};
use crate::navigate::Route;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

/// Forgot-password wizard position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecoveryStep {
    Email,
    Otp { email: String },
    NewPassword { email: String },
    Done,
}

/// Result of the final reset step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// Password reset and the automatic login produced an active session.
    SignedIn { user_id: String },
    /// Password reset, but this device must sign in through the OTP step-up.
    LoginRequired,
}

#[derive(Debug)]
pub struct PasswordRecovery {
    ctx: AuthContext,
    step: RecoveryStep,
}

impl PasswordRecovery {
    #[must_use]
    pub fn new(ctx: AuthContext) -> Self {
        Self {
            ctx,
            step: RecoveryStep::Email,
        }
    }

    #[must_use]
    pub fn step(&self) -> &RecoveryStep {
        &self.step
    }

    /// Requests a recovery OTP. Advances only when the server acknowledges
    /// with a message.
    ///
    /// # Errors
    /// Returns an error if the wizard is past the email step or the request fails.
    #[instrument(skip_all)]
    pub async fn send_otp(&mut self, email: &str) -> Result<&RecoveryStep, AuthError> {
        if self.step != RecoveryStep::Email {
            return Err(AuthError::InvalidState("recovery OTP was already requested"));
        }
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::Validation("Email is required.".to_string()));
        }

        let response = self
            .ctx
            .client
            .forgot_password(&ForgotPasswordRequest {
                email: email.to_string(),
            })
            .await?;

        if response.message.is_some() {
            self.step = RecoveryStep::Otp {
                email: email.to_string(),
            };
        }
        Ok(&self.step)
    }

    /// # Errors
    /// Returns an error if no OTP is pending or the server rejects it.
    #[instrument(skip_all)]
    pub async fn verify_otp(&mut self, otp: &SecretString) -> Result<&RecoveryStep, AuthError> {
        let RecoveryStep::Otp { email } = &self.step else {
            return Err(AuthError::InvalidState("no recovery OTP is pending"));
        };
        let otp = otp.expose_secret().trim();
        if otp.is_empty() {
            return Ok(&self.step);
        }

        let response = self
            .ctx
            .client
            .verify_otp(&VerifyOtpRequest {
                email: email.clone(),
                otp: SecretString::from(otp.to_string()),
            })
            .await?;

        if response.message.is_some() {
            self.step = RecoveryStep::NewPassword {
                email: email.clone(),
            };
        }
        Ok(&self.step)
    }

    /// Sets the new password and signs in with it from this device.
    ///
    /// The sign-in carries the device fingerprint, so an unregistered device is
    /// sent to the login page for the OTP step-up instead of being let in.
    ///
    /// # Errors
    /// Returns an error if the OTP was not verified, the password is too weak,
    /// or the reset or login request fails.
    #[instrument(skip_all)]
    pub async fn reset(&mut self, new_password: &SecretString) -> Result<RecoveryOutcome, AuthError> {
        let RecoveryStep::NewPassword { email } = &self.step else {
            return Err(AuthError::InvalidState("recovery OTP was not verified"));
        };
        let email = email.clone();
        if !validate_password(new_password.expose_secret()) {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters long, contain at least one uppercase letter and one number."
                    .to_string(),
            ));
        }

        self.ctx
            .client
            .reset_password(&ResetPasswordRequest {
                email: email.clone(),
                new_password: new_password.clone(),
            })
            .await?;
        self.step = RecoveryStep::Done;
        info!("password reset");

        let device_id = match self.ctx.fingerprint.visitor_id().await {
            Ok(device_id) => device_id,
            Err(err) => {
                warn!("Error getting fingerprint: {err}");
                self.ctx.navigator.navigate(&Route::Login);
                return Ok(RecoveryOutcome::LoginRequired);
            }
        };

        let response = self
            .ctx
            .client
            .login(&LoginRequest {
                email,
                password: new_password.clone(),
                device_id: device_id.to_string(),
            })
            .await?;

        if response.otp_required() {
            self.ctx.navigator.navigate(&Route::Login);
            return Ok(RecoveryOutcome::LoginRequired);
        }

        let session = session_from_parts(response.access_token, response.user_id)?;
        self.ctx.activate_and_land(&session).await?;
        Ok(RecoveryOutcome::SignedIn {
            user_id: session.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::fixture;
    use crate::auth::PasswordCipher;
    use crate::fingerprint::StaticFingerprint;
    use crate::session::{SessionStore, ACCESS_TOKEN};
    use anyhow::Result;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    async fn mount_otp_steps(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/auth/forgot-password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "OTP sent"})))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/verify-otp"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message": "OTP verified"})),
            )
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/reset-password"))
            .and(body_json(json!({"email": "a@b.co", "newPassword": "NewSecret9"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message": "Password reset"})),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn full_recovery_signs_in_known_device() -> Result<()> {
        let server = MockServer::start().await;
        mount_otp_steps(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({
                "email": "a@b.co",
                "password": "NewSecret9",
                "deviceId": "fp-123"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "abc", "userId": "u1"})),
            )
            .mount(&server)
            .await;

        let f = fixture(&server.uri(), StaticFingerprint::new("fp-123"));
        let mut recovery = PasswordRecovery::new(f.ctx.clone());

        recovery.send_otp("a@b.co").await?;
        assert!(matches!(recovery.step(), RecoveryStep::Otp { .. }));
        recovery.verify_otp(&secret("123456")).await?;
        assert!(matches!(recovery.step(), RecoveryStep::NewPassword { .. }));

        let outcome = recovery.reset(&secret("NewSecret9")).await?;
        assert_eq!(
            outcome,
            RecoveryOutcome::SignedIn {
                user_id: "u1".to_string()
            }
        );
        assert_eq!(recovery.step(), &RecoveryStep::Done);
        assert_eq!(f.store.get(ACCESS_TOKEN).await?.as_deref(), Some("abc"));
        assert_eq!(f.navigator.routes(), vec![Route::Dashboard]);
        Ok(())
    }

    #[tokio::test]
    async fn auto_login_encrypts_new_password() -> Result<()> {
        let server = MockServer::start().await;
        mount_otp_steps(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "abc", "userId": "u1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cipher = PasswordCipher::new(secret("frontend-secret"))?;
        let mut f = fixture(&server.uri(), StaticFingerprint::new("fp-123"));
        f.ctx.client = f.ctx.client.clone().with_password_cipher(cipher.clone());
        let mut recovery = PasswordRecovery::new(f.ctx.clone());
        recovery.send_otp("a@b.co").await?;
        recovery.verify_otp(&secret("123456")).await?;
        recovery.reset(&secret("NewSecret9")).await?;

        let requests = server.received_requests().await.unwrap();
        let login = requests
            .iter()
            .find(|request| request.url.path() == "/api/auth/login")
            .unwrap();
        let body: serde_json::Value = login.body_json()?;
        let password = body["password"].as_str().unwrap();
        assert_ne!(password, "NewSecret9");
        assert_eq!(cipher.decrypt(password).as_deref(), Some("NewSecret9"));
        assert_eq!(body["deviceId"], "fp-123");
        Ok(())
    }

    #[tokio::test]
    async fn unknown_device_is_sent_to_login_after_reset() -> Result<()> {
        let server = MockServer::start().await;
        mount_otp_steps(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"loggedIn": false})))
            .mount(&server)
            .await;

        let f = fixture(&server.uri(), StaticFingerprint::new("fp-999"));
        let mut recovery = PasswordRecovery::new(f.ctx.clone());
        recovery.send_otp("a@b.co").await?;
        recovery.verify_otp(&secret("123456")).await?;

        let outcome = recovery.reset(&secret("NewSecret9")).await?;
        assert_eq!(outcome, RecoveryOutcome::LoginRequired);
        assert!(f.store.is_empty().await);
        assert_eq!(f.navigator.routes(), vec![Route::Login]);
        Ok(())
    }

    #[tokio::test]
    async fn silent_acknowledgement_does_not_advance() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/forgot-password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let f = fixture(&server.uri(), StaticFingerprint::new("fp-123"));
        let mut recovery = PasswordRecovery::new(f.ctx);
        recovery.send_otp("a@b.co").await?;
        assert_eq!(recovery.step(), &RecoveryStep::Email);
        Ok(())
    }

    #[tokio::test]
    async fn steps_cannot_be_skipped() {
        let f = fixture("http://127.0.0.1:9", StaticFingerprint::new("fp-123"));
        let mut recovery = PasswordRecovery::new(f.ctx);
        assert!(matches!(
            recovery.verify_otp(&secret("123456")).await,
            Err(AuthError::InvalidState(_))
        ));
        assert!(matches!(
            recovery.reset(&secret("NewSecret9")).await,
            Err(AuthError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn rejected_otp_keeps_step() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/forgot-password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "OTP sent"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/verify-otp"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid OTP"})),
            )
            .mount(&server)
            .await;

        let f = fixture(&server.uri(), StaticFingerprint::new("fp-123"));
        let mut recovery = PasswordRecovery::new(f.ctx);
        recovery.send_otp("a@b.co").await?;
        let err = recovery.verify_otp(&secret("000000")).await.unwrap_err();
        assert_eq!(err.user_message("Something went wrong"), "Invalid OTP");
        assert!(matches!(recovery.step(), RecoveryStep::Otp { .. }));
        Ok(())
    }
}
