use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    linkcard::logging::init().context("init logging")?;

    let cli = linkcard::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        linkcard::cli::Command::Preview(args) => {
            linkcard::card::run(args).await.context("preview")?;
        }
        linkcard::cli::Command::Search(args) => {
            linkcard::imagery::run(args).await.context("search")?;
        }
    }

    Ok(())
}
