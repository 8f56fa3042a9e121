use clap::Parser;
use nomadlogs::adapter::inbound::cli::{self, command::Cli, output};
use nomadlogs::infrastructure::config::settings::Config;
use tracing::debug;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    cli::configure(&cli);

    let mut config = match Config::load_or_default(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            output::error(&format!("Failed to load config: {e}"));
            std::process::exit(1);
        }
    };

    config.logging.apply_verbosity(cli.quiet, cli.verbose);
    config.logging.init();
    debug!(command = cli.command.name(), "nomadlogs starting");

    let subcommand = cli.command.name();
    if let Err(e) = cli::execute(cli, config).await {
        if e.is_input() {
            cli::usage_error(subcommand, &e).exit();
        }
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
