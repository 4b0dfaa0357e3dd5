use clap::Parser;
use focus::cli::commands::Cli;
use focus::cli::handlers;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding a tracing filter, used when no -v is given
const LOG_ENV: &str = "FOCUS_LOG";

fn main() {
    let cli = Cli::parse();

    let default_level = handlers::configured_log_level(cli.project_dir.as_deref())
        .unwrap_or_else(|| "warn".to_string());
    setup_logging(cli.verbose, &default_level);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbosity: u8, default_level: &str) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level)),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        3 => EnvFilter::new("trace"),
        _ => {
            eprintln!("Don't be crazy, max is -vvv");
            EnvFilter::new("trace")
        }
    };

    // Logs go to stderr so stdout stays clean for --json
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .without_time();

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    tracing::debug!(verbosity, "logging initialized");
}
