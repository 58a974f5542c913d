//! Contentful CLI - generate models and maintain the SQL mirror from the terminal

mod cli;
mod commands;
mod error;

use clap::Parser;
use contentful_core::config::ContentfulConfig;

use crate::cli::{Cli, Commands};
use crate::commands::apply::run_apply;
use crate::commands::completions::run_completions;
use crate::commands::content_types::run_content_types;
use crate::commands::generate::run_generate;
use crate::commands::migrate::run_migrate;
use crate::commands::records::run_records;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "contentful=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ContentfulConfig::from_env()?;
    if let Some(db_path) = cli.db_path {
        config.database_path = db_path;
    }
    if let Some(locale) = cli.locale {
        config.default_locale = locale;
    }
    let schema = cli.schema.as_deref();

    match cli.command {
        Commands::Generate {
            only,
            model_dir,
            mapper_dir,
        } => {
            if let Some(model_dir) = model_dir {
                config.model_dir = model_dir;
            }
            if let Some(mapper_dir) = mapper_dir {
                config.mapper_dir = mapper_dir;
            }
            run_generate(&config, schema, &only).await?;
        }
        Commands::ContentTypes { json } => run_content_types(&config, schema, json).await?,
        Commands::Migrate => run_migrate(&config).await?,
        Commands::Apply { action, payload } => {
            run_apply(&config, schema, &action, payload.as_deref()).await?;
        }
        Commands::Records { content_type, json } => {
            run_records(&config, schema, &content_type, json).await?;
        }
        Commands::Sync { export, json } => {
            run_sync(&config, schema, export.as_deref(), json).await?;
        }
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
    }

    Ok(())
}
