//! Newsdesk CLI binary.
//!
//! This binary provides command-line access to the coordinator:
//! - Run the scheduler, posting, and maintenance loops
//! - Moderate content (approve, reject, list, stats)
//! - Apply database migrations

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, handle_content_command, migrate, run_coordinator};

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run { config } => {
            run_coordinator(&config).await?;
        }

        Commands::Migrate => {
            migrate().await?;
        }

        Commands::Content(content_cmd) => {
            handle_content_command(content_cmd).await?;
        }
    }

    Ok(())
}
