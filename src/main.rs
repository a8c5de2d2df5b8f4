// speculate - temporary AWS credentials from STS

use clap::Parser;
use speculate::{cli, env};

#[tokio::main]
async fn main() {
    let args = cli::Cli::parse();

    if args.headless {
        env::set_headless_override(true);
    }

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    // stdout carries exports and URLs, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::execute(args).await {
        tracing::debug!("Command failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
