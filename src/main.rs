use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use groupfeed::cli::commands::{self, ExportOptions};
use groupfeed::cli::{Cli, Commands};
use groupfeed::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(workers) = cli.workers {
        config.scrape.workers = workers;
    }

    match cli.command {
        Commands::Export {
            captures,
            output,
            stubs,
            max_posts,
            resume,
        } => {
            let options = ExportOptions {
                output,
                stubs,
                max_posts,
                resume,
            };
            commands::export(&config, captures, options).await?;
        }
        Commands::Inspect { captures, json } => {
            commands::inspect(&config, captures, json).await?;
        }
        Commands::Parse {
            kind,
            body,
            post_id,
        } => {
            commands::parse(&config, kind.into(), &body, post_id.as_deref())?;
        }
    }

    Ok(())
}
