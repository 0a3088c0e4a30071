use anyhow::Result;
use clap::Parser;

use deroute::application::commands::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();
    commands::run(cli).await
}
