use crate::{
    auth::{self, RegisterOutcome, Registration},
    cli::globals::GlobalArgs,
};
use anyhow::{anyhow, bail, Result};
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: SecretString,
    pub username: String,
    pub bank_account: String,
}

/// # Errors
/// Returns an error if validation fails or the server refuses the account.
pub async fn execute(args: Args) -> Result<()> {
    let ctx = args.globals.context()?;
    let outcome = auth::register(
        &ctx,
        Registration {
            email: args.email,
            password: args.password,
            username: args.username,
            bank_account: args.bank_account,
        },
    )
    .await
    .map_err(|err| anyhow!(err.user_message("Registration failed. Please try again.")))?;

    match outcome {
        RegisterOutcome::Registered { message } => {
            println!("{message}");
            Ok(())
        }
        refused => bail!("{}", refused.user_message()),
    }
}
