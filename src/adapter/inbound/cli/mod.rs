//! CLI module graph and command dispatch.

pub mod command;
pub mod download;
pub mod ls;
pub mod output;
pub mod tail;

use std::fmt::Display;

use clap::error::ErrorKind;
use clap::CommandFactory;

use self::command::{Cli, ColorChoice, Commands};
use self::output::OutputConfig;
use crate::adapter::outbound::nomad::NomadClient;
use crate::application::format::ColorMode;
use crate::error::Result;
use crate::infrastructure::config::nomad::NomadConfig;
use crate::infrastructure::config::settings::Config;

impl From<ColorChoice> for ColorMode {
    fn from(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Auto => Self::Auto,
            ColorChoice::Always => Self::Always,
            ColorChoice::Never => Self::Never,
        }
    }
}

/// Apply the global output flags: JSON/quiet mode and color override.
pub fn configure(cli: &Cli) {
    output::configure(OutputConfig::new(cli.json, cli.quiet));
    match cli.color {
        ColorChoice::Auto => owo_colors::unset_override(),
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
}

/// Run the parsed command.
///
/// # Errors
///
/// Input errors (see [`Error::is_input`](crate::error::Error::is_input)) and
/// fatal setup or connectivity errors.
pub async fn execute(cli: Cli, config: Config) -> Result<()> {
    let colors = ColorMode::from(cli.color);
    match cli.command {
        Commands::Ls(args) => ls::execute(&args, &config).await,
        Commands::Tail(args) => tail::execute(args, config, colors).await,
        Commands::Download => {
            download::execute();
            Ok(())
        }
    }
}

/// A clap usage error for `subcommand`, printed with its usage line.
pub fn usage_error(subcommand: &str, message: impl Display) -> clap::Error {
    let mut root = Cli::command();
    root.build();
    let found = root.find_subcommand(subcommand).cloned();
    let mut command = found.unwrap_or(root);
    command.error(ErrorKind::InvalidValue, message)
}

/// Resolve the agent address and build a client for it.
fn nomad_client(addr: Option<&str>, config: &NomadConfig) -> Result<NomadClient> {
    let address = config.resolve_address(addr)?;
    NomadClient::new(address, config)
}
