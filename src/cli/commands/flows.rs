use clap::{Arg, ArgAction, Command};

pub const CMD_HANDSHAKE: &str = "handshake";
pub const CMD_LOGIN: &str = "login";
pub const CMD_REGISTER: &str = "register";
pub const CMD_RECOVER: &str = "recover";
pub const CMD_WHOAMI: &str = "whoami";
pub const CMD_LOGOUT: &str = "logout";

pub const ARG_URL: &str = "url";
pub const ARG_REJECT_ON_FINGERPRINT_ERROR: &str = "reject-on-fingerprint-error";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_OTP: &str = "otp";
pub const ARG_USERNAME: &str = "username";
pub const ARG_BANK_ACCOUNT: &str = "bank-account";
pub const ARG_NEW_PASSWORD: &str = "new-password";

fn email() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long(ARG_EMAIL)
        .help("Account email")
        .env("TRUSTGATE_EMAIL")
        .required(true)
}

fn otp() -> Arg {
    Arg::new(ARG_OTP)
        .long(ARG_OTP)
        .help("One-time password from the email; prompted for when omitted")
        .env("TRUSTGATE_OTP")
        .hide_env_values(true)
}

#[must_use]
pub fn subcommands(command: Command) -> Command {
    command
        .subcommand_required(true)
        .subcommand(
            Command::new(CMD_HANDSHAKE)
                .about("Run the device trust gate on a redirect URL")
                .arg(
                    Arg::new(ARG_URL)
                        .help("Landing URL carrying access_token, userId and deviceIds")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_REJECT_ON_FINGERPRINT_ERROR)
                        .long(ARG_REJECT_ON_FINGERPRINT_ERROR)
                        .help("Treat an unavailable fingerprint as an unregistered device")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Password login, with OTP verification for new devices")
                .arg(email())
                .arg(
                    Arg::new(ARG_PASSWORD)
                        .short('p')
                        .long(ARG_PASSWORD)
                        .help("Account password")
                        .env("TRUSTGATE_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(otp()),
        )
        .subcommand(
            Command::new(CMD_REGISTER)
                .about("Create an account bound to this device")
                .arg(email())
                .arg(
                    Arg::new(ARG_PASSWORD)
                        .short('p')
                        .long(ARG_PASSWORD)
                        .help("At least 8 characters with one uppercase letter and one digit")
                        .env("TRUSTGATE_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_USERNAME)
                        .short('u')
                        .long(ARG_USERNAME)
                        .help("Display name")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_BANK_ACCOUNT)
                        .long(ARG_BANK_ACCOUNT)
                        .help("Bank account number")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new(CMD_RECOVER)
                .about("Reset a forgotten password and sign in")
                .arg(email())
                .arg(otp())
                .arg(
                    Arg::new(ARG_NEW_PASSWORD)
                        .long(ARG_NEW_PASSWORD)
                        .help("New password")
                        .env("TRUSTGATE_NEW_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new(CMD_WHOAMI).about("Load the signed-in profile and refresh the token"),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("Remove the local session"))
}
