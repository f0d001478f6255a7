mod app;
mod cli;
mod fullscreen;
mod gallery;
mod logging;
mod page;
mod thumbnail;
mod ui;
mod utils;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
