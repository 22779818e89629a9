pub mod handshake;
pub mod login;
pub mod recover;
pub mod register;
pub mod session;

mod prompt;
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Handshake(handshake::Args),
    Login(login::Args),
    Register(register::Args),
    Recover(recover::Args),
    Whoami(GlobalArgs),
    Logout(GlobalArgs),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
