use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use contentful_core::api::{ContentKind, EntryCollection, EntrySource, ManagementApi};
use contentful_core::config::ContentfulConfig;
use contentful_core::generator::list_content_types;
use contentful_core::schema::{ContentType, ContentTypeCollection};
use contentful_core::services::MirrorService;
use contentful_core::sync::Outcome;
use contentful_core::{EntryPayload, ModelRegistry};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// Content types read from an exported JSON file
#[derive(Debug, Clone)]
pub struct ContentTypeFile {
    path: PathBuf,
}

impl ContentTypeFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ManagementApi for ContentTypeFile {
    async fn content_types(&self) -> contentful_core::Result<ContentTypeCollection> {
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Space export written by `contentful space export`
#[derive(Debug, Clone)]
pub struct ExportFile {
    path: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpaceExport {
    #[serde(default)]
    content_types: Vec<ContentType>,
    #[serde(default)]
    entries: Vec<EntryPayload>,
    #[serde(default)]
    assets: Vec<EntryPayload>,
}

impl ExportFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> contentful_core::Result<SpaceExport> {
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl ManagementApi for ExportFile {
    async fn content_types(&self) -> contentful_core::Result<ContentTypeCollection> {
        let items = self.read()?.content_types;
        Ok(ContentTypeCollection {
            total: items.len(),
            items,
        })
    }
}

#[async_trait]
impl EntrySource for ExportFile {
    async fn published(
        &self,
        kind: ContentKind,
        skip: usize,
    ) -> contentful_core::Result<EntryCollection> {
        let export = self.read()?;
        let all = match kind {
            ContentKind::Assets => export.assets,
            ContentKind::Entries => export.entries,
        };
        Ok(EntryCollection {
            total: all.len(),
            items: all.into_iter().skip(skip).collect(),
            skip,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ContentTypeListItem {
    pub id: String,
    pub name: String,
    pub fields: Vec<String>,
}

pub fn content_type_to_list_item(content_type: &ContentType) -> ContentTypeListItem {
    ContentTypeListItem {
        id: content_type.id.clone(),
        name: content_type.name.clone(),
        fields: content_type
            .fields
            .iter()
            .map(|field| field.id.clone())
            .collect(),
    }
}

/// Content types from the schema file when given, otherwise from the Management API
pub async fn load_content_types(
    config: &ContentfulConfig,
    schema: Option<&Path>,
) -> Result<Vec<ContentType>, CliError> {
    let content_types = if let Some(path) = schema {
        list_content_types(&ContentTypeFile::new(path)).await?
    } else {
        list_content_types(&config.management_client()?).await?
    };
    Ok(content_types)
}

pub async fn load_registry(
    config: &ContentfulConfig,
    schema: Option<&Path>,
) -> Result<ModelRegistry, CliError> {
    let content_types = load_content_types(config, schema).await?;
    Ok(build_registry(config, &content_types))
}

fn build_registry(config: &ContentfulConfig, content_types: &[ContentType]) -> ModelRegistry {
    let mut registry = ModelRegistry::with_defaults(&config.table_prefix);
    registry.register_schema(content_types, &config.table_prefix);
    registry
}

pub async fn open_mirror(
    config: &ContentfulConfig,
    schema: Option<&Path>,
) -> Result<MirrorService, CliError> {
    let registry = load_registry(config, schema).await?;
    open_mirror_with(config, registry).await
}

/// Mirror whose models come from an explicit content type source
pub async fn open_mirror_from(
    config: &ContentfulConfig,
    api: &dyn ManagementApi,
) -> Result<MirrorService, CliError> {
    let content_types = list_content_types(api).await?;
    open_mirror_with(config, build_registry(config, &content_types)).await
}

async fn open_mirror_with(
    config: &ContentfulConfig,
    registry: ModelRegistry,
) -> Result<MirrorService, CliError> {
    Ok(MirrorService::open_path(
        &config.database_path,
        config.database_options(),
        registry,
        &config.default_locale,
    )
    .await?)
}

pub fn read_payload(path: Option<&Path>) -> Result<String, CliError> {
    let raw = if let Some(path) = path {
        std::fs::read_to_string(path)?
    } else {
        let mut stdin = io::stdin();
        if stdin.is_terminal() {
            return Err(CliError::EmptyPayload);
        }
        let mut buffer = String::new();
        stdin.read_to_string(&mut buffer)?;
        buffer
    };

    if raw.trim().is_empty() {
        return Err(CliError::EmptyPayload);
    }
    Ok(raw)
}

pub fn describe_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Created {
            table,
            contentful_id,
            id,
        } => format!("Created {table} #{id} ({contentful_id})"),
        Outcome::Updated {
            table,
            contentful_id,
            id,
        } => format!("Updated {table} #{id} ({contentful_id})"),
        Outcome::Deleted {
            table,
            contentful_id,
            rows,
        } => format!("Deleted {rows} row(s) from {table} ({contentful_id})"),
        Outcome::Ignored { action } => format!("Ignored action {action}"),
    }
}
