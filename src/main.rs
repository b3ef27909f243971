mod arxiv;
mod cli;
mod config;
mod embedding;
mod morph;
mod search;
mod wiki;

pub const USER_AGENT: &str = concat!("arxiv-lens/", env!("CARGO_PKG_VERSION"));

use clap::Parser;
use cli::params::Cli;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("arxiv_lens=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    info!("starting arxiv-lens");

    cli::run(cli)
        .await
        .inspect_err(|e| tracing::error!("search failed: {e}"))
}
