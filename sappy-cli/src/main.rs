//! Sappy CLI - track water usage, onboard, and shop for Sappy.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "sappy-cli",
    version,
    about = "Water-saving companion: keep Sappy the plant happy"
)]
struct Cli {
    #[command(subcommand)]
    command: sappy_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    sappy_cmd::run(cli.command).await
}
