//! umlchain - inheritance chain diagrams for Java classes

mod chain_cli;

use clap::Parser;
use javatools::ToolConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "umlchain")]
#[command(about = "Resolve Java inheritance chains into PlantUML class diagrams", version)]
struct Cli {
    #[command(subcommand)]
    command: chain_cli::ChainCommands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for diagram text
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ToolConfig::from_env();

    chain_cli::run(cli.command, config).await
}
