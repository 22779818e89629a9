//! Request and response payloads for the auth server. Passwords, OTPs and
//! bearer tokens are held as `SecretString` so they never reach logs through
//! `Debug`.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn secret_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|value| !value.is_empty())
        .map(SecretString::from))
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    pub device_id: String,
}

/// `loggedIn: false` means the device is unknown and an OTP was sent.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "loggedIn")]
    pub logged_in: Option<bool>,
    #[serde(default, deserialize_with = "secret_opt")]
    pub access_token: Option<SecretString>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub message: Option<String>,
}

impl LoginResponse {
    #[must_use]
    pub fn otp_required(&self) -> bool {
        self.logged_in == Some(false)
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpDeviceRequest {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub otp: SecretString,
    pub device_id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default, deserialize_with = "secret_opt")]
    pub access_token: Option<SecretString>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    pub username: String,
    pub bank_account: String,
    pub device_id: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "secret_opt")]
    pub access_token: Option<SecretString>,
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub otp: SecretString,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub new_password: SecretString,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MessageResponse {
    pub message: Option<String>,
}

/// Profile summary used for routing decisions; other fields are ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: Option<String>,
    pub username: Option<String>,
    pub is_kyc_verified: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user: Option<UserProfile>,
    #[serde(default, deserialize_with = "secret_opt")]
    pub new_access_token: Option<SecretString>,
}
