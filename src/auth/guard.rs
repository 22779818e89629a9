use super::{types::UserProfile, AuthContext, AuthError};
use crate::{
    navigate::Route,
    session::{self, ACCESS_TOKEN},
};
use secrecy::ExposeSecret;
use tracing::{info, instrument, warn};

/// Profile loaded for an authenticated view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hydrated {
    Ready(UserProfile),
    /// KYC is explicitly incomplete; the user was routed to KYC.
    KycRequired(UserProfile),
}

impl Hydrated {
    #[must_use]
    pub fn profile(&self) -> &UserProfile {
        match self {
            Self::Ready(profile) | Self::KycRequired(profile) => profile,
        }
    }
}

/// Loads the signed-in user's profile with the stored bearer token.
///
/// A rotated token from the server replaces the stored one. A failed fetch
/// sends the user back to login.
///
/// # Errors
/// Returns `NotLoggedIn` without a stored session, or the fetch error.
#[instrument(skip_all)]
pub async fn hydrate(ctx: &AuthContext) -> Result<Hydrated, AuthError> {
    let Some(session) = session::current(ctx.store.as_ref()).await? else {
        return Err(AuthError::NotLoggedIn);
    };

    let response = match ctx
        .client
        .fetch_user(&session.user_id, &session.access_token)
        .await
    {
        Ok(response) => response,
        Err(err) => {
            warn!("Failed to fetch user data: {err}");
            ctx.navigator.navigate(&Route::Login);
            return Err(err);
        }
    };

    if let Some(token) = &response.new_access_token {
        ctx.store.set(ACCESS_TOKEN, token.expose_secret()).await?;
        info!("access token rotated");
    }

    let profile = response.user.unwrap_or_default();
    if profile.is_kyc_verified == Some(false) {
        ctx.navigator.navigate(&Route::Kyc);
        return Ok(Hydrated::KycRequired(profile));
    }
    Ok(Hydrated::Ready(profile))
}
