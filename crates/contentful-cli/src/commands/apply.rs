use std::path::Path;

use contentful_core::config::ContentfulConfig;
use contentful_core::sync::{Outcome, WebhookAction};
use contentful_core::EntryPayload;

use crate::commands::common::{describe_outcome, open_mirror, read_payload};
use crate::error::CliError;

pub async fn run_apply(
    config: &ContentfulConfig,
    schema: Option<&Path>,
    action: &str,
    payload_path: Option<&Path>,
) -> Result<(), CliError> {
    let raw = read_payload(payload_path)?;
    let outcome = apply(config, schema, action, &raw).await?;
    println!("{}", describe_outcome(&outcome));
    Ok(())
}

pub async fn apply(
    config: &ContentfulConfig,
    schema: Option<&Path>,
    action: &str,
    raw_payload: &str,
) -> Result<Outcome, CliError> {
    let action = WebhookAction::parse(action);
    let payload: EntryPayload = serde_json::from_str(raw_payload)?;
    let mirror = open_mirror(config, schema).await?;
    Ok(mirror.apply(&action, &payload).await?)
}
