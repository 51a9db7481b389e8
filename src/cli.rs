use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Immutable display options used by the stream consumer and formatter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    pub raw: bool,
    pub all: bool,
    pub verbose: bool,
    pub http_bodies: bool,
    pub profile: String,
    pub container: Option<String>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            raw: false,
            all: false,
            verbose: false,
            http_bodies: true,
            profile: "default".into(),
            container: None,
        }
    }
}

/// Everything `main` needs beyond the display options
#[derive(Debug, Clone)]
pub struct Config {
    pub display: DisplayOptions,
    pub config_path: Option<PathBuf>,
    pub debug: bool,
}

/// User-facing CLI arguments (kept private to the CLI layer)
#[derive(Parser, Debug)]
#[command(name = "wt-logs", version, about = "Streaming, real-time logs")]
struct Args {
    /// Container to stream logs from (defaults to the profile's container)
    #[arg(value_name = "CONTAINER")]
    container: Option<String>,

    /// Do not pretty print
    #[arg(short = 'r', long = "raw")]
    raw: bool,

    /// Show cluster logs
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// Show verbose logs
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Name of the webtask profile to use
    #[arg(short = 'p', long = "profile", default_value = "default")]
    profile: String,

    /// Show request and response bodies
    #[arg(
        short = 'b',
        long = "httpBodies",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    http_bodies: bool,

    /// Hide request and response bodies
    #[arg(long = "no-httpBodies", alias = "no-http-bodies")]
    no_http_bodies: bool,

    /// Profile store location (defaults to ~/.webtask)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print internal diagnostics to stderr
    #[arg(long = "debug")]
    debug: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            display: DisplayOptions {
                raw: args.raw,
                all: args.all,
                verbose: args.verbose,
                http_bodies: args.http_bodies && !args.no_http_bodies,
                profile: args.profile,
                container: args.container,
            },
            config_path: args.config,
            debug: args.debug,
        }
    }
}

/// Parse CLI options into an application Config
pub fn parse() -> Config {
    Args::parse().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_from(argv: &[&str]) -> Config {
        Args::try_parse_from(argv).unwrap().into()
    }

    #[test]
    fn defaults_match_documented_flags() {
        let config = parse_from(&["wt-logs"]);
        assert_eq!(config.display, DisplayOptions::default());
        assert!(config.config_path.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn short_aliases_and_positional_container() {
        let config = parse_from(&["wt-logs", "-r", "-a", "-v", "-p", "prod", "sandbox1"]);
        let display = config.display;
        assert!(display.raw && display.all && display.verbose);
        assert_eq!(display.profile, "prod");
        assert_eq!(display.container.as_deref(), Some("sandbox1"));
    }

    #[test]
    fn http_bodies_can_be_switched_off() {
        assert!(!parse_from(&["wt-logs", "--httpBodies=false"]).display.http_bodies);
        assert!(!parse_from(&["wt-logs", "--no-httpBodies"]).display.http_bodies);
        let config = parse_from(&["wt-logs", "-b", "sandbox1"]);
        assert!(config.display.http_bodies);
        assert_eq!(config.display.container.as_deref(), Some("sandbox1"));
    }
}
