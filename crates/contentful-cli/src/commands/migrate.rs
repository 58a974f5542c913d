use contentful_core::config::ContentfulConfig;
use contentful_core::db::{Database, DatabaseOptions};

use crate::error::CliError;

pub async fn run_migrate(config: &ContentfulConfig) -> Result<(), CliError> {
    let version = migrate(config).await?;
    println!(
        "{} is at schema version {version}",
        config.database_path.display()
    );
    Ok(())
}

/// Open the database and apply pending migrations regardless of configuration
pub async fn migrate(config: &ContentfulConfig) -> Result<i32, CliError> {
    if let Some(parent) = config
        .database_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::open(&config.database_path, DatabaseOptions::default()).await?;
    Ok(db.schema_version().await?)
}
