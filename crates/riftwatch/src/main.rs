mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use riftwatch_config::Config;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // A bad config still gets reported through miette below; logging
    // starts with defaults in that case.
    let cfg = load_config(&cli.global);
    let log_to_file = cfg.as_ref().is_ok_and(|c| c.logging.file);
    let _guard = init_tracing(cli.global.verbose, log_to_file);

    let result = match cfg {
        Ok(cfg) => run(cli, &cfg).await,
        Err(e) => Err(e),
    };
    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Logs go to stderr (stdout belongs to command output and the relay),
/// plus a daily-rolling file when `logging.file` is set.
fn init_tracing(verbosity: u8, log_to_file: bool) -> Option<WorkerGuard> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = if log_to_file {
        let appender = tracing_appender::rolling::daily(riftwatch_config::log_dir(), "riftwatch.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let cfg = match &global.config {
        Some(path) => riftwatch_config::load_config_from(path)?,
        None => riftwatch_config::load_config()?,
    };
    Ok(cfg)
}

async fn run(cli: Cli, cfg: &Config) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need the client
        Command::Config(args) => commands::config_cmd::handle(cfg, args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "riftwatch", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, cfg, &cli.global).await
        }
    }
}
