//! `nomadlogs tail`: stream merged logs until interrupted.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::command::TailArgs;
use super::{nomad_client, output};
use crate::application::format::{ColorMode, LineFormatter, RenderMode};
use crate::application::tail::{self, StdoutSink};
use crate::domain::parse_targets;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Tail the targets in `args` until Ctrl-C or a closed stdout.
pub async fn execute(args: TailArgs, mut config: Config, colors: ColorMode) -> Result<()> {
    let targets = parse_targets(&args.targets)?;

    apply_overrides(&args, &mut config)?;
    if args.follow {
        debug!("Streams always follow; -f has no effect");
    }

    let client = Arc::new(nomad_client(args.addr.as_deref(), &config.nomad)?);
    debug!(address = %client.address(), targets = targets.len(), "Tailing");

    let mode = if output::is_json() {
        RenderMode::Raw
    } else {
        RenderMode::Formatted
    };
    let formatter = LineFormatter::new(mode, colors);

    let (shutdown_tx, shutdown) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                shutdown_tx.send_replace(true);
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                shutdown_tx.closed().await;
            }
        }
    });

    let mut sink = StdoutSink::new();
    tail::run(targets, client, &config.watch, formatter, &mut sink, shutdown).await
}

/// Layer `tail` flags over the loaded configuration.
fn apply_overrides(args: &TailArgs, config: &mut Config) -> Result<()> {
    if let Some(ms) = args.poll_interval {
        config.watch.poll_interval_ms = ms;
        config.watch.max_backoff_ms = config.watch.max_backoff_ms.max(ms);
        config.validate()?;
    }
    if let Some(n) = args.lines {
        config.watch.backlog_lines = Some(n);
    }
    Ok(())
}
