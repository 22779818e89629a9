use crate::cli::actions::{handshake, login, recover, register, session, Action};
use anyhow::Result;

/// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Handshake(args) => handshake::execute(args).await,
        Action::Login(args) => login::execute(args).await,
        Action::Register(args) => register::execute(args).await,
        Action::Recover(args) => recover::execute(args).await,
        Action::Whoami(globals) => session::whoami(&globals).await,
        Action::Logout(globals) => session::logout(&globals).await,
    }
}
