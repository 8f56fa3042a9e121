//! Command-line interface definitions.
//!
//! Defines the CLI structure for nomadlogs using `clap`: `ls` lists
//! allocations, `tail` streams their logs, `download` is a placeholder.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Tail and list task logs of Nomad allocations
#[derive(Parser, Debug)]
#[command(name = "nomadlogs")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output: `ls` prints a JSON array, `tail` prints raw lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to a config file (default: ~/.nomadlogs/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List allocations and the state of their tasks
    Ls(LsArgs),

    /// Stream logs of every running allocation of the given tasks
    Tail(TailArgs),

    /// Download allocation logs (not implemented yet)
    Download,
}

impl Commands {
    /// Subcommand name as typed on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ls(_) => "ls",
            Self::Tail(_) => "tail",
            Self::Download => "download",
        }
    }
}

/// Arguments for `nomadlogs ls`.
#[derive(Args, Debug, Default)]
pub struct LsArgs {
    /// Nomad agent address (default: $NOMAD_ADDR, then http://127.0.0.1:4646)
    #[arg(long, value_name = "URL")]
    pub addr: Option<String>,
}

/// Arguments for `nomadlogs tail`.
#[derive(Args, Debug, Default)]
pub struct TailArgs {
    /// Replay roughly the last N lines of each stream before following
    #[arg(short = 'n', value_name = "N")]
    pub lines: Option<usize>,

    /// Follow the logs (always on; accepted for compatibility)
    #[arg(short = 'f', long)]
    pub follow: bool,

    /// Nomad agent address (default: $NOMAD_ADDR, then http://127.0.0.1:4646)
    #[arg(long, value_name = "URL")]
    pub addr: Option<String>,

    /// Allocation discovery interval in milliseconds
    #[arg(long, value_name = "MS")]
    pub poll_interval: Option<u64>,

    /// Tasks to tail, as `task` or `job:task`
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "nomadlogs");
        assert!(cmd.get_version().is_some());
        assert!(cmd.get_about().is_some());
    }

    #[test]
    fn test_color_choice_default_is_auto() {
        assert!(matches!(ColorChoice::default(), ColorChoice::Auto));
    }

    #[test]
    fn test_parse_ls() {
        let cli = Cli::try_parse_from(["nomadlogs", "ls"]).unwrap();
        assert!(matches!(cli.command, Commands::Ls(LsArgs { addr: None })));
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_ls_addr_and_json() {
        let cli =
            Cli::try_parse_from(["nomadlogs", "ls", "--addr", "http://nomad:4646", "--json"]).unwrap();
        assert!(cli.json);
        let Commands::Ls(args) = cli.command else {
            panic!("expected ls");
        };
        assert_eq!(args.addr.as_deref(), Some("http://nomad:4646"));
    }

    #[test]
    fn test_parse_tail_targets_and_flags() {
        let cli = Cli::try_parse_from([
            "nomadlogs",
            "tail",
            "-n",
            "20",
            "-f",
            "--poll-interval",
            "1000",
            "web:app",
            "worker",
        ])
        .unwrap();
        assert_eq!(cli.command.name(), "tail");
        let Commands::Tail(args) = cli.command else {
            panic!("expected tail");
        };
        assert_eq!(args.lines, Some(20));
        assert!(args.follow);
        assert_eq!(args.poll_interval, Some(1000));
        assert_eq!(args.targets, vec!["web:app", "worker"]);
    }

    #[test]
    fn test_parse_tail_without_targets_is_accepted() {
        // Reported as a usage error after parsing.
        let cli = Cli::try_parse_from(["nomadlogs", "tail"]).unwrap();
        let Commands::Tail(args) = cli.command else {
            panic!("expected tail");
        };
        assert!(args.targets.is_empty());
        assert_eq!(args.lines, None);
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "nomadlogs", "tail", "app", "--json", "-vv", "--color", "never", "--config", "x.toml",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.color, ColorChoice::Never));
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_parse_download() {
        let cli = Cli::try_parse_from(["nomadlogs", "download"]).unwrap();
        assert!(matches!(cli.command, Commands::Download));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["nomadlogs", "tail", "--bogus", "app"]).is_err());
        assert!(Cli::try_parse_from(["nomadlogs", "tail", "-n", "ten", "app"]).is_err());
    }
}
