use std::path::Path;

use contentful_core::config::ContentfulConfig;
use contentful_core::sync::{backfill, BackfillReport};

use crate::commands::common::{open_mirror, open_mirror_from, ExportFile};
use crate::error::CliError;

pub async fn run_sync(
    config: &ContentfulConfig,
    schema: Option<&Path>,
    export: Option<&Path>,
    as_json: bool,
) -> Result<(), CliError> {
    let report = sync(config, schema, export).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Mirrored {} entries ({} created, {} updated)",
        report.written(),
        report.created,
        report.updated
    );
    for skipped in &report.skipped {
        eprintln!(
            "Skipped {} {}: {}",
            skipped.kind, skipped.contentful_id, skipped.reason
        );
    }
    Ok(())
}

/// Backfill the mirror from a space export, or from the Management API when
/// no export is given. `--schema` still overrides where models come from.
pub async fn sync(
    config: &ContentfulConfig,
    schema: Option<&Path>,
    export: Option<&Path>,
) -> Result<BackfillReport, CliError> {
    let report = if let Some(path) = export {
        let export = ExportFile::new(path);
        let mirror = if schema.is_some() {
            open_mirror(config, schema).await?
        } else {
            open_mirror_from(config, &export).await?
        };
        backfill(&export, &mirror).await?
    } else {
        let client = config.management_client()?;
        let mirror = open_mirror(config, schema).await?;
        backfill(&client, &mirror).await?
    };
    Ok(report)
}
