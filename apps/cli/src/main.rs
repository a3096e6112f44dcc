//! classgrab CLI — classroom portal scraper.
//!
//! Converts the portal's rendered HTML into structured academic records
//! (courses, grades, assessment breakdowns, materials, group rosters).

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
