use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::app::App;

mod cli;

const LOG_ENV: &str = "HEXPIPE_LOG";

fn main() -> anyhow::Result<()> {
    init_tracing();
    App::parse().run()
}

/// Diagnostics go to stderr so they never mix with hex on stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).compact().init();
}
