use super::{
    session_from_parts,
    types::{LoginRequest, VerifyOtpDeviceRequest},
    AuthContext, AuthError,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument};

/// Password login with the OTP step-up for unknown devices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginState {
    /// Waiting for email and password.
    Credentials,
    /// Server reported `loggedIn: false`; an OTP was sent to `email`.
    OtpRequired { email: String, device_id: String },
    /// Session active.
    Verified { user_id: String },
}

#[derive(Debug)]
pub struct LoginFlow {
    ctx: AuthContext,
    state: LoginState,
}

impl LoginFlow {
    #[must_use]
    pub fn new(ctx: AuthContext) -> Self {
        Self {
            ctx,
            state: LoginState::Credentials,
        }
    }

    #[must_use]
    pub fn state(&self) -> &LoginState {
        &self.state
    }

    /// Submits credentials together with the local device fingerprint.
    ///
    /// # Errors
    /// Returns an error when the fingerprint is unavailable, the server rejects
    /// the login, or the session cannot be activated. The flow stays in
    /// `Credentials` on error.
    #[instrument(skip_all)]
    pub async fn submit_credentials(
        &mut self,
        email: &str,
        password: &SecretString,
    ) -> Result<&LoginState, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.expose_secret().trim().is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required.".to_string(),
            ));
        }

        let device_id = self.ctx.fingerprint.visitor_id().await?;
        let response = self
            .ctx
            .client
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.clone(),
                device_id: device_id.to_string(),
            })
            .await?;

        if response.otp_required() {
            info!("unknown device, OTP verification required");
            self.state = LoginState::OtpRequired {
                email: email.to_string(),
                device_id: device_id.to_string(),
            };
            return Ok(&self.state);
        }

        let session = session_from_parts(response.access_token, response.user_id)?;
        self.ctx.activate_and_land(&session).await?;
        self.state = LoginState::Verified {
            user_id: session.user_id,
        };
        Ok(&self.state)
    }

    /// Verifies the OTP for the pending device. An empty OTP is ignored.
    ///
    /// # Errors
    /// Returns an error if no OTP is pending, the server rejects the OTP, or the
    /// session cannot be activated. The flow stays in `OtpRequired` on error so
    /// the user can retry.
    #[instrument(skip_all)]
    pub async fn submit_otp(&mut self, otp: &SecretString) -> Result<&LoginState, AuthError> {
        let LoginState::OtpRequired { email, device_id } = &self.state else {
            return Err(AuthError::InvalidState("no OTP verification is pending"));
        };

        if otp.expose_secret().trim().is_empty() {
            return Ok(&self.state);
        }

        let response = self
            .ctx
            .client
            .verify_otp_device(&VerifyOtpDeviceRequest {
                email: email.clone(),
                otp: SecretString::from(otp.expose_secret().trim().to_string()),
                device_id: device_id.clone(),
            })
            .await?;

        let session = session_from_parts(response.access_token, response.user_id)?;
        self.ctx.activate_and_land(&session).await?;
        info!(user_id = %session.user_id, "device verified");
        self.state = LoginState::Verified {
            user_id: session.user_id,
        };
        Ok(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::fixture;
    use crate::fingerprint::StaticFingerprint;
    use crate::navigate::Route;
    use crate::session::{SessionStore, ACCESS_TOKEN, USER_ID};
    use anyhow::Result;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[tokio::test]
    async fn known_device_logs_in_directly() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"loggedIn": true, "access_token": "abc", "userId": "u1"})),
            )
            .mount(&server)
            .await;

        let f = fixture(&server.uri(), StaticFingerprint::new("fp-123"));
        let mut flow = LoginFlow::new(f.ctx.clone());
        let state = flow.submit_credentials("a@b.co", &secret("Secret123")).await?;

        assert_eq!(
            state,
            &LoginState::Verified {
                user_id: "u1".to_string()
            }
        );
        assert_eq!(f.store.get(ACCESS_TOKEN).await?.as_deref(), Some("abc"));
        assert_eq!(f.navigator.routes(), vec![Route::Dashboard]);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_device_steps_up_to_otp() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"loggedIn": false, "message": "OTP sent"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/verify-otp-device"))
            .and(body_json(json!({
                "email": "a@b.co",
                "otp": "123456",
                "deviceId": "fp-123"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "abc", "userId": "u1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let f = fixture(&server.uri(), StaticFingerprint::new("fp-123"));
        let mut flow = LoginFlow::new(f.ctx.clone());

        flow.submit_credentials(" a@b.co ", &secret("Secret123"))
            .await?;
        assert!(matches!(flow.state(), LoginState::OtpRequired { .. }));
        assert!(f.store.is_empty().await);
        assert!(f.navigator.routes().is_empty());

        // empty OTP is ignored
        flow.submit_otp(&secret("  ")).await?;
        assert!(matches!(flow.state(), LoginState::OtpRequired { .. }));

        flow.submit_otp(&secret("123456")).await?;
        assert!(matches!(flow.state(), LoginState::Verified { .. }));
        assert_eq!(f.store.get(USER_ID).await?.as_deref(), Some("u1"));
        assert_eq!(f.navigator.routes(), vec![Route::Dashboard]);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_otp_keeps_step_up_state() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"loggedIn": false})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/verify-otp-device"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({})))
            .mount(&server)
            .await;

        let f = fixture(&server.uri(), StaticFingerprint::new("fp-123"));
        let mut flow = LoginFlow::new(f.ctx.clone());
        flow.submit_credentials("a@b.co", &secret("Secret123")).await?;

        let err = flow.submit_otp(&secret("000000")).await.unwrap_err();
        assert_eq!(err.user_message("Invalid OTP"), "Invalid OTP");
        assert!(matches!(flow.state(), LoginState::OtpRequired { .. }));
        assert!(f.store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn otp_without_pending_step_up_is_rejected() {
        let f = fixture("http://127.0.0.1:9", StaticFingerprint::new("fp-123"));
        let mut flow = LoginFlow::new(f.ctx);
        let result = flow.submit_otp(&secret("123456")).await;
        assert!(matches!(result, Err(AuthError::InvalidState(_))));
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let f = fixture("http://127.0.0.1:9", StaticFingerprint::new("fp-123"));
        let mut flow = LoginFlow::new(f.ctx);
        let result = flow.submit_credentials("", &secret("Secret123")).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
        assert_eq!(flow.state(), &LoginState::Credentials);
    }

    #[tokio::test]
    async fn fingerprint_failure_blocks_login() {
        let f = fixture("http://127.0.0.1:9", StaticFingerprint::unavailable());
        let mut flow = LoginFlow::new(f.ctx);
        let result = flow.submit_credentials("a@b.co", &secret("Secret123")).await;
        assert!(matches!(result, Err(AuthError::Fingerprint(_))));
    }

    #[tokio::test]
    async fn server_error_message_is_preserved() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"message": "Invalid email or password"})),
            )
            .mount(&server)
            .await;

        let f = fixture(&server.uri(), StaticFingerprint::new("fp-123"));
        let mut flow = LoginFlow::new(f.ctx);
        let err = flow
            .submit_credentials("a@b.co", &secret("wrong"))
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message("Something went wrong"),
            "Invalid email or password"
        );
        Ok(())
    }
}
