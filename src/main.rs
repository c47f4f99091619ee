use anyhow::Result;
use clap::Parser;
use echodrill::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    echodrill::app::run(cli).await?;
    Ok(())
}
