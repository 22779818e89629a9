//! Log level options.
//!
//! Precedence: `--log-level` on the command line, then `-q`/`-v`, then
//! `TRUSTGATE_LOG_LEVEL`, then errors only. `RUST_LOG` directives are layered
//! on top by the telemetry filter.

use clap::{parser::ValueSource, Arg, ArgAction, ArgMatches, Command};
use tracing::level_filters::LevelFilter;

pub const ARG_LOG_LEVEL: &str = "log-level";
pub const ARG_VERBOSE: &str = "verbose";
pub const ARG_QUIET: &str = "quiet";

const DEFAULT_LEVEL: LevelFilter = LevelFilter::ERROR;

/// Level reached by one, two, three or more `-v`.
const VERBOSE_STEPS: [LevelFilter; 4] = [
    LevelFilter::WARN,
    LevelFilter::INFO,
    LevelFilter::DEBUG,
    LevelFilter::TRACE,
];

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value.parse::<LevelFilter>().map_err(|_| {
        format!("invalid log level '{value}': expected off, error, warn, info, debug or trace")
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_LOG_LEVEL)
                .long(ARG_LOG_LEVEL)
                .value_name("LEVEL")
                .help("Log level: off, error, warn, info, debug, trace")
                .env("TRUSTGATE_LOG_LEVEL")
                .value_parser(parse_level)
                .global(true),
        )
        .arg(
            Arg::new(ARG_VERBOSE)
                .short('v')
                .long(ARG_VERBOSE)
                .help("Raise the log level one step per use, starting from warn")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new(ARG_QUIET)
                .short('q')
                .long(ARG_QUIET)
                .help("Disable logging; errors are still printed on exit")
                .action(ArgAction::SetTrue)
                .conflicts_with(ARG_VERBOSE)
                .global(true),
        )
}

/// Resolves the effective level from the parsed options.
#[must_use]
pub fn level(matches: &ArgMatches) -> LevelFilter {
    let configured = matches.get_one::<LevelFilter>(ARG_LOG_LEVEL).copied();
    if matches.value_source(ARG_LOG_LEVEL) == Some(ValueSource::CommandLine) {
        if let Some(level) = configured {
            return level;
        }
    }

    if matches.get_flag(ARG_QUIET) {
        return LevelFilter::OFF;
    }

    match usize::from(matches.get_count(ARG_VERBOSE)) {
        0 => configured.unwrap_or(DEFAULT_LEVEL),
        count => VERBOSE_STEPS[count.min(VERBOSE_STEPS.len()) - 1],
    }
}
