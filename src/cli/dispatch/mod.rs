//! Maps parsed CLI matches to an [`Action`].

use crate::cli::actions::{handshake, login, recover, register, Action};
use crate::cli::commands::{client, flows};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}

fn secret(matches: &ArgMatches, id: &str) -> Option<SecretString> {
    matches
        .get_one::<String>(id)
        .map(|value| SecretString::from(value.clone()))
}

/// # Errors
/// Returns an error if the subcommand is unknown or required arguments are missing.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let (name, sub_m) = matches
        .subcommand()
        .context("a subcommand is required")?;
    let globals = client::parse(sub_m)?;

    match name {
        flows::CMD_HANDSHAKE => Ok(Action::Handshake(handshake::Args {
            globals,
            url: required(sub_m, flows::ARG_URL)?,
            reject_on_fingerprint_error: sub_m.get_flag(flows::ARG_REJECT_ON_FINGERPRINT_ERROR),
        })),
        flows::CMD_LOGIN => Ok(Action::Login(login::Args {
            globals,
            email: required(sub_m, flows::ARG_EMAIL)?,
            password: secret(sub_m, flows::ARG_PASSWORD)
                .context("missing required argument: --password")?,
            otp: secret(sub_m, flows::ARG_OTP),
        })),
        flows::CMD_REGISTER => Ok(Action::Register(register::Args {
            globals,
            email: required(sub_m, flows::ARG_EMAIL)?,
            password: secret(sub_m, flows::ARG_PASSWORD)
                .context("missing required argument: --password")?,
            username: required(sub_m, flows::ARG_USERNAME)?,
            bank_account: required(sub_m, flows::ARG_BANK_ACCOUNT)?,
        })),
        flows::CMD_RECOVER => Ok(Action::Recover(recover::Args {
            globals,
            email: required(sub_m, flows::ARG_EMAIL)?,
            otp: secret(sub_m, flows::ARG_OTP),
            new_password: secret(sub_m, flows::ARG_NEW_PASSWORD)
                .context("missing required argument: --new-password")?,
        })),
        flows::CMD_WHOAMI => Ok(Action::Whoami(globals)),
        flows::CMD_LOGOUT => Ok(Action::Logout(globals)),
        other => Err(anyhow!("unknown subcommand: {other}")),
    }
}
