use std::path::Path;

use contentful_core::config::ContentfulConfig;
use contentful_core::Record;

use crate::commands::common::open_mirror;
use crate::error::CliError;

pub async fn run_records(
    config: &ContentfulConfig,
    schema: Option<&Path>,
    content_type: &str,
    as_json: bool,
) -> Result<(), CliError> {
    let mirror = open_mirror(config, schema).await?;
    let records = mirror.records(content_type).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No {content_type} entries mirrored.");
        return Ok(());
    }

    for line in format_record_lines(&records) {
        println!("{line}");
    }
    Ok(())
}

pub fn format_record_lines(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            let values = record
                .values
                .iter()
                .map(|(column, value)| format!("{column}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            format!("#{} {} {values}", record.id, record.contentful_id)
        })
        .collect()
}
