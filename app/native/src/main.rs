//! ZoneSnap command-line front end.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use zonesnap_lib::cli::Cli;

/// Environment variable holding the log filter, e.g. `zonesnap_lib=trace`.
const LOG_ENV_VAR: &str = "ZONESNAP_LOG";

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = cli.execute() {
        eprintln!("zonesnap: {err}");
        std::process::exit(1);
    }
}

/// Installs the fmt subscriber. `ZONESNAP_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
