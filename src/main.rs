//! make-card - Main Entry Point
//!
//! Trains the demo classifier and writes its model card.

use clap::Parser;
use make_card::cli::{cmd_generate, Cli};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "make_card=info".into()),
        )
        .init();

    let cli = Cli::parse();
    cmd_generate(&cli)?;

    Ok(())
}
