//! Tandem - release every package of a monorepo in tandem

mod cli;
mod exit_codes;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::{output, Cli};

fn main() {
    let cli = Cli::parse();
    let _guard = init_tracing(&cli);

    if let Err(err) = cli.execute() {
        output::error(&format!("{:#}", err));
        std::process::exit(exit_codes::for_error(&err));
    }
}

/// Default console filter for the verbosity flags
fn console_directive(cli: &Cli) -> &'static str {
    if cli.verbose {
        "tandem=debug,tandem_core=debug,tandem_git=debug,tandem_changelog=debug,tandem_adapters=debug"
    } else if cli.quiet {
        "warn"
    } else {
        "tandem=info,tandem_core=info,tandem_git=info,tandem_changelog=info,tandem_adapters=info"
    }
}

/// Set up tracing with two layers:
/// - Console: RUST_LOG, or a level picked from -v/-q
/// - File: always debug-level JSON to ~/.tandem/logs/
fn init_tracing(cli: &Cli) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_directive(cli)));

    if let Some(log_dir) = log_directory() {
        let file_appender = tracing_appender::rolling::daily(&log_dir, "tandem.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_filter(console_filter),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_filter(EnvFilter::new("debug")),
            )
            .init();

        return Some(guard);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    None
}

/// Returns the log directory path, creating it if needed.
fn log_directory() -> Option<std::path::PathBuf> {
    let log_dir = dirs::home_dir()?.join(".tandem").join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;
    Some(log_dir)
}
