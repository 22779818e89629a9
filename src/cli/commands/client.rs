use crate::{cli::globals::GlobalArgs, navigate::Route};
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use std::path::PathBuf;

pub const ARG_API_URL: &str = "api-url";
pub const ARG_SESSION_FILE: &str = "session-file";
pub const ARG_FINGERPRINT: &str = "fingerprint";
pub const ARG_LANDING_ROUTE: &str = "landing-route";
pub const ARG_PASSWORD_PASSPHRASE: &str = "password-passphrase";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Auth server base URL")
                .env("TRUSTGATE_API_BASE_URL")
                .default_value("http://localhost:3001")
                .global(true),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long(ARG_SESSION_FILE)
                .help("File holding access_token, userId and deviceId")
                .env("TRUSTGATE_SESSION_FILE")
                .default_value(".trustgate/session.json")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new(ARG_FINGERPRINT)
                .long(ARG_FINGERPRINT)
                .help("Visitor id computed by the fingerprinting agent for this device")
                .env("TRUSTGATE_FINGERPRINT")
                .global(true),
        )
        .arg(
            Arg::new(ARG_LANDING_ROUTE)
                .long(ARG_LANDING_ROUTE)
                .help("Route opened after a session is activated")
                .env("TRUSTGATE_LANDING_ROUTE")
                .default_value("/dashboard")
                .global(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD_PASSPHRASE)
                .long(ARG_PASSWORD_PASSPHRASE)
                .help("Passphrase for servers expecting AES-encrypted login and register passwords")
                .env("TRUSTGATE_PASSWORD_PASSPHRASE")
                .hide_env_values(true)
                .global(true),
        )
}

/// Reads the shared options from the top-level or subcommand matches.
///
/// # Errors
/// Returns an error if a defaulted option is missing.
pub fn parse(matches: &ArgMatches) -> Result<GlobalArgs> {
    let api_url = matches
        .get_one::<String>(ARG_API_URL)
        .cloned()
        .context("missing required argument: --api-url")?;
    let session_file = matches
        .get_one::<PathBuf>(ARG_SESSION_FILE)
        .cloned()
        .context("missing required argument: --session-file")?;

    let mut globals = GlobalArgs::new(api_url, session_file);
    globals.fingerprint = matches
        .get_one::<String>(ARG_FINGERPRINT)
        .filter(|value| !value.trim().is_empty())
        .cloned();
    globals.password_passphrase = matches
        .get_one::<String>(ARG_PASSWORD_PASSPHRASE)
        .filter(|value| !value.is_empty())
        .map(|value| SecretString::from(value.clone()));
    if let Some(landing) = matches.get_one::<String>(ARG_LANDING_ROUTE) {
        globals.landing = Route::from_path(landing);
    }
    Ok(globals)
}
