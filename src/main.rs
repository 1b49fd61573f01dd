use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use mintrend::cli::{run, Cli};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    run(Cli::parse())
}
