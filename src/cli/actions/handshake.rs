use crate::{
    cli::globals::GlobalArgs,
    gate::{FingerprintFailure, GateOutcome, GatePolicy},
};
use anyhow::{bail, Context, Result};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub url: String,
    pub reject_on_fingerprint_error: bool,
}

/// Runs the device trust gate on a landing URL.
/// # Errors
/// Returns an error if the URL is invalid or no session was activated.
pub async fn execute(args: Args) -> Result<()> {
    let url = Url::parse(args.url.trim()).context("invalid landing URL")?;
    let ctx = args.globals.context()?;

    let policy = GatePolicy {
        on_fingerprint_error: if args.reject_on_fingerprint_error {
            FingerprintFailure::Reject
        } else {
            FingerprintFailure::Stay
        },
        ..GatePolicy::default()
    };

    let outcome = ctx.device_gate(policy).run(&url).await;
    info!(?outcome, "handshake finished");

    match outcome {
        GateOutcome::Activated { user_id } => {
            println!("session activated for {user_id}");
            Ok(())
        }
        GateOutcome::Inert => bail!("URL carries no access_token/userId"),
        GateOutcome::Aborted => bail!("device fingerprint unavailable; nothing changed"),
        GateOutcome::Rejected => bail!("Device not registered. Kindly log in to add this device."),
        GateOutcome::StoreUnconfirmed => bail!("session could not be confirmed in the session file"),
    }
}
