use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;
use std::ffi::OsString;
use tracing::level_filters::LevelFilter;

/// Parses the process arguments, installs logging at the requested level and
/// returns the action to run.
///
/// # Errors
///
/// Returns an error if telemetry initialization or action dispatch fails
pub fn start() -> Result<Action> {
    let (level, action) = prepare(std::env::args_os())?;
    telemetry::init(level)?;
    Ok(action)
}

/// Usage errors print clap's message and exit with its status code.
fn prepare<I, T>(args: I) -> Result<(LevelFilter, Action)>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = commands::new()
        .try_get_matches_from(args)
        .unwrap_or_else(|err| err.exit());

    let level = commands::logging::level(&matches);
    let action = dispatch::handler(&matches)?;
    Ok((level, action))
}
