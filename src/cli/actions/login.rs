use super::prompt;
use crate::{
    auth::{LoginFlow, LoginState},
    cli::globals::GlobalArgs,
};
use anyhow::{anyhow, Result};
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: SecretString,
    pub otp: Option<SecretString>,
}

/// Logs in, asking for the emailed OTP when the device is new.
/// # Errors
/// Returns an error with the server's message if any step fails.
pub async fn execute(args: Args) -> Result<()> {
    let mut flow = LoginFlow::new(args.globals.context()?);

    flow.submit_credentials(&args.email, &args.password)
        .await
        .map_err(|err| anyhow!(err.user_message("Something went wrong")))?;

    let pending = flow.state().clone();
    if let LoginState::OtpRequired { email, .. } = pending {
        let otp = match args.otp {
            Some(otp) => otp,
            None => prompt::read_secret(&format!("OTP sent to {email}: ")).await?,
        };
        flow.submit_otp(&otp)
            .await
            .map_err(|err| anyhow!(err.user_message("Invalid OTP")))?;
    }

    match flow.state() {
        LoginState::Verified { user_id } => {
            println!("logged in as {user_id}");
            Ok(())
        }
        _ => Err(anyhow!("OTP is required to register this device")),
    }
}
