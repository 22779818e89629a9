use super::prompt;
use crate::{
    auth::{PasswordRecovery, RecoveryOutcome, RecoveryStep},
    cli::globals::GlobalArgs,
};
use anyhow::{anyhow, bail, Result};
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub otp: Option<SecretString>,
    pub new_password: SecretString,
}

/// Walks the forgot-password steps, then signs in with the new password.
/// # Errors
/// Returns an error if the server rejects a step.
pub async fn execute(args: Args) -> Result<()> {
    let mut recovery = PasswordRecovery::new(args.globals.context()?);

    recovery
        .send_otp(&args.email)
        .await
        .map_err(|err| anyhow!(err.user_message("Something went wrong")))?;
    if !matches!(recovery.step(), RecoveryStep::Otp { .. }) {
        bail!("the server did not confirm that an OTP was sent");
    }

    let otp = match args.otp {
        Some(otp) => otp,
        None => prompt::read_secret(&format!("OTP sent to {}: ", args.email.trim())).await?,
    };
    recovery
        .verify_otp(&otp)
        .await
        .map_err(|err| anyhow!(err.user_message("Invalid OTP")))?;
    if !matches!(recovery.step(), RecoveryStep::NewPassword { .. }) {
        bail!("OTP was not accepted");
    }

    let outcome = recovery
        .reset(&args.new_password)
        .await
        .map_err(|err| anyhow!(err.user_message("Password reset or login failed")))?;

    match outcome {
        RecoveryOutcome::SignedIn { user_id } => println!("password reset; logged in as {user_id}"),
        RecoveryOutcome::LoginRequired => {
            println!("password reset; log in to verify this device");
        }
    }
    Ok(())
}
