use anyhow::Context;
use clap::Parser;
use coord_converter::cli::{run, Cli};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    run(cli).await.context("coord-converter failed")
}
