use secrecy::SecretString;
use url::Url;

pub const PARAM_ACCESS_TOKEN: &str = "access_token";
pub const PARAM_USER_ID: &str = "userId";
pub const PARAM_DEVICE_IDS: &str = "deviceIds";

/// Pending handshake carried by the redirect URL.
#[derive(Clone, Debug)]
pub struct HandshakeParams {
    pub access_token: SecretString,
    pub user_id: String,
    /// Raw `deviceIds` value after query decoding; still URL-encoded JSON.
    pub device_ids: Option<String>,
}

impl HandshakeParams {
    /// Extracts the handshake from the query string.
    ///
    /// Returns `None` unless both `access_token` and `userId` are present and
    /// non-empty. The first occurrence of a repeated parameter wins.
    #[must_use]
    pub fn from_url(url: &Url) -> Option<Self> {
        let mut access_token = None;
        let mut user_id = None;
        let mut device_ids = None;

        for (name, value) in url.query_pairs() {
            match name.as_ref() {
                PARAM_ACCESS_TOKEN if access_token.is_none() => {
                    access_token = Some(value.into_owned());
                }
                PARAM_USER_ID if user_id.is_none() => user_id = Some(value.into_owned()),
                PARAM_DEVICE_IDS if device_ids.is_none() => {
                    device_ids = Some(value.into_owned());
                }
                _ => {}
            }
        }

        let access_token = access_token.filter(|value| !value.is_empty())?;
        let user_id = user_id.filter(|value| !value.is_empty())?;

        Some(Self {
            access_token: SecretString::from(access_token),
            user_id,
            device_ids,
        })
    }
}
