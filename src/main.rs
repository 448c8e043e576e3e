mod cli;
mod commands;
mod output;
mod telemetry;

use std::io;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use cli::{Cli, Commands};
use gh_query::{Config, GitHubClient, Result};
use std::error::Error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");

        // Show error chain if verbose flag was passed
        if std::env::args().any(|arg| arg == "--verbose" || arg == "-v") {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = std::error::Error::source(cause);
            }
        }

        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    telemetry::init(cli.verbose);
    output::set_format(cli.output_format());
    output::set_quiet(cli.quiet);

    match cli.command {
        // Commands that don't require config/client
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "ghq", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run().await?;
        }
        // Commands that require config and client
        command => {
            let config = Config::load()?;
            let client = Arc::new(GitHubClient::from_config(&config)?);

            match command {
                Commands::Query(args) => {
                    commands::query::run(client, args).await?;
                }
                Commands::Viewer => {
                    commands::viewer::show(client).await?;
                }
                Commands::Replay { file } => {
                    commands::replay::run(client, &file).await?;
                }
                Commands::Completions { .. } | Commands::Init => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
