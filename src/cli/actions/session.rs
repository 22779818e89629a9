use crate::{
    auth::{self, Hydrated},
    cli::globals::GlobalArgs,
};
use anyhow::{anyhow, Result};

/// Prints the signed-in profile, refreshing the stored token.
/// # Errors
/// Returns an error when no session exists or the profile cannot be loaded.
pub async fn whoami(globals: &GlobalArgs) -> Result<()> {
    let ctx = globals.context()?;
    let hydrated = auth::hydrate(&ctx)
        .await
        .map_err(|err| anyhow!(err.user_message("Failed to fetch user data")))?;

    let profile = hydrated.profile();
    println!(
        "{} <{}>",
        profile.username.as_deref().unwrap_or("-"),
        profile.email.as_deref().unwrap_or("-")
    );
    if matches!(hydrated, Hydrated::KycRequired(_)) {
        println!("KYC verification pending");
    }
    Ok(())
}

/// # Errors
/// Returns an error if the session file cannot be updated.
pub async fn logout(globals: &GlobalArgs) -> Result<()> {
    let ctx = globals.context()?;
    auth::logout(&ctx).await?;
    println!("You have been successfully logged out.");
    Ok(())
}
