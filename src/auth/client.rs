//! HTTP client for the auth server with a consistent timeout and error mapping.
//! Request bodies carry passwords and OTPs, so requests are never logged with
//! their payloads.

use super::{
    cipher::PasswordCipher,
    types::{
        ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
        RegisterResponse, ResetPasswordRequest, TokenResponse, UserResponse,
        VerifyOtpDeviceRequest, VerifyOtpRequest,
    },
    AuthError,
};
use crate::APP_USER_AGENT;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Default request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct AuthClient {
    http: Client,
    base_url: String,
    password_cipher: Option<PasswordCipher>,
}

impl AuthClient {
    /// Builds a client for the given API base URL.
    ///
    /// # Errors
    /// Returns an error if the base URL is empty or not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, AuthError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(AuthError::Config("API base URL is not configured.".to_string()));
        }

        let parsed = Url::parse(base_url)
            .map_err(|err| AuthError::Config(format!("Invalid API base URL: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AuthError::Config(format!(
                "Unsupported API base URL scheme: {}",
                parsed.scheme()
            )));
        }

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| AuthError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            password_cipher: None,
        })
    }

    /// Encrypts login and registration passwords before they are posted.
    /// Reset requests keep the new password as typed.
    #[must_use]
    pub fn with_password_cipher(mut self, cipher: PasswordCipher) -> Self {
        self.password_cipher = Some(cipher);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn encrypts_passwords(&self) -> bool {
        self.password_cipher.is_some()
    }

    fn wire_password(&self, password: &SecretString) -> SecretString {
        match &self.password_cipher {
            Some(cipher) => cipher.encrypt(password),
            None => password.clone(),
        }
    }

    /// Password login. A `loggedIn: false` response starts the OTP step-up.
    ///
    /// # Errors
    /// Returns an error on transport failures or non-2xx responses.
    #[instrument(skip_all)]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let request = LoginRequest {
            password: self.wire_password(&request.password),
            ..request.clone()
        };
        self.post_json("/api/auth/login", &request).await
    }

    /// Verifies the device OTP and registers the device with the account.
    ///
    /// # Errors
    /// Returns an error on transport failures or non-2xx responses.
    #[instrument(skip_all)]
    pub async fn verify_otp_device(
        &self,
        request: &VerifyOtpDeviceRequest,
    ) -> Result<TokenResponse, AuthError> {
        self.post_json("/api/auth/verify-otp-device", request).await
    }

    /// # Errors
    /// Returns an error on transport failures or non-2xx responses.
    #[instrument(skip_all)]
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, AuthError> {
        let request = RegisterRequest {
            password: self.wire_password(&request.password),
            ..request.clone()
        };
        self.post_json("/api/auth/register", &request).await
    }

    /// # Errors
    /// Returns an error on transport failures or non-2xx responses.
    #[instrument(skip_all)]
    pub async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> Result<MessageResponse, AuthError> {
        self.post_json("/api/auth/forgot-password", request).await
    }

    /// # Errors
    /// Returns an error on transport failures or non-2xx responses.
    #[instrument(skip_all)]
    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<MessageResponse, AuthError> {
        self.post_json("/api/auth/verify-otp", request).await
    }

    /// # Errors
    /// Returns an error on transport failures or non-2xx responses.
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<serde_json::Value, AuthError> {
        self.post_json("/api/auth/reset-password", request).await
    }

    /// Fetches the user profile with the bearer token; the server may rotate it.
    ///
    /// # Errors
    /// Returns an error on transport failures or non-2xx responses.
    #[instrument(skip(self, token))]
    pub async fn fetch_user(
        &self,
        user_id: &str,
        token: &SecretString,
    ) -> Result<UserResponse, AuthError> {
        let url = self.url(&format!("/api/auth/{}", urlencoding::encode(user_id)));
        let request = self.http.get(url).bearer_auth(token.expose_secret());
        handle_json_response(send(request).await?).await
    }

    fn url(&self, path: &str) -> String {
        build_url_with_base(&self.base_url, path)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let request = self.http.post(url).json(body);
        handle_json_response(send(request).await?).await
    }
}

/// Joins a base URL and a path with exactly one slash between them.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

async fn send(request: RequestBuilder) -> Result<Response, AuthError> {
    request.send().await.map_err(map_request_error)
}

/// Maps transport errors into `AuthError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> AuthError {
    if err.is_timeout() {
        AuthError::Timeout("Request timed out. Please try again.".to_string())
    } else {
        AuthError::Network(format!("Unable to reach the server: {err}"))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Parses JSON responses and surfaces HTTP errors with the server's message.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| AuthError::Parse(format!("Failed to decode response: {err}")))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(AuthError::Http {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

/// Prefers the JSON `message` field, falling back to the trimmed body.
fn error_message(body: &str) -> Option<String> {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message.as_deref().and_then(sanitize),
        Err(_) => sanitize(body),
    }
}

fn sanitize(message: &str) -> Option<String> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_ERROR_CHARS).collect())
    }
}
