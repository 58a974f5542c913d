use std::path::Path;

use contentful_core::config::ContentfulConfig;

use crate::commands::common::{
    content_type_to_list_item, load_content_types, ContentTypeListItem,
};
use crate::error::CliError;

pub async fn run_content_types(
    config: &ContentfulConfig,
    schema: Option<&Path>,
    as_json: bool,
) -> Result<(), CliError> {
    let items = load_content_types(config, schema)
        .await?
        .iter()
        .map(content_type_to_list_item)
        .collect::<Vec<ContentTypeListItem>>();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for item in &items {
        println!("{:<24} {} ({} fields)", item.id, item.name, item.fields.len());
    }
    Ok(())
}
