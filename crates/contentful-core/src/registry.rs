//! Content type registry: which model and mapper serve a content type.
//!
//! Lookups consult the application tier first and fall back to the package
//! defaults, so an application can override any built-in or schema-driven
//! model without touching the defaults.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::mapper::{AssetMapper, EntryMapper, SchemaMapper};
use crate::models::{ModelDefinition, ASSET_CONTENT_TYPE};
use crate::schema::{self, ContentType};

/// Builds the table layout of a model
pub type ModelFactory = Arc<dyn Fn() -> ModelDefinition + Send + Sync>;

/// Builds the mapper of a model
pub type MapperFactory = Arc<dyn Fn() -> Box<dyn EntryMapper> + Send + Sync>;

#[derive(Clone, Default)]
struct Tier {
    models: HashMap<String, ModelFactory>,
    mappers: HashMap<String, MapperFactory>,
}

/// Two-tier lookup of content type id to model and mapper factories
#[derive(Clone, Default)]
pub struct ModelRegistry {
    application: Tier,
    defaults: Tier,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("application_models", &keys(&self.application.models))
            .field("application_mappers", &keys(&self.application.mappers))
            .field("default_models", &keys(&self.defaults.models))
            .field("default_mappers", &keys(&self.defaults.mappers))
            .finish()
    }
}

fn keys<V>(map: &HashMap<String, V>) -> BTreeSet<&str> {
    map.keys().map(String::as_str).collect()
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in asset model and mapper
    pub fn with_defaults(prefix: &str) -> Self {
        let mut registry = Self::new();
        let asset = AssetMapper::definition(prefix);
        registry.register_default_model(ASSET_CONTENT_TYPE, move || asset.clone());
        registry.register_default_mapper(ASSET_CONTENT_TYPE, || Box::new(AssetMapper));
        registry
    }

    /// Register an application model, overriding any default
    pub fn register_model(
        &mut self,
        content_type: impl Into<String>,
        factory: impl Fn() -> ModelDefinition + Send + Sync + 'static,
    ) {
        self.application
            .models
            .insert(content_type.into(), Arc::new(factory));
    }

    /// Register an application mapper, overriding any default
    pub fn register_mapper(
        &mut self,
        content_type: impl Into<String>,
        factory: impl Fn() -> Box<dyn EntryMapper> + Send + Sync + 'static,
    ) {
        self.application
            .mappers
            .insert(content_type.into(), Arc::new(factory));
    }

    /// Register a package default model
    pub fn register_default_model(
        &mut self,
        content_type: impl Into<String>,
        factory: impl Fn() -> ModelDefinition + Send + Sync + 'static,
    ) {
        self.defaults
            .models
            .insert(content_type.into(), Arc::new(factory));
    }

    /// Register a package default mapper
    pub fn register_default_mapper(
        &mut self,
        content_type: impl Into<String>,
        factory: impl Fn() -> Box<dyn EntryMapper> + Send + Sync + 'static,
    ) {
        self.defaults
            .mappers
            .insert(content_type.into(), Arc::new(factory));
    }

    /// Register schema-driven defaults for every content type.
    ///
    /// The asset content type keeps the built-in asset mapper.
    pub fn register_schema(&mut self, content_types: &[ContentType], prefix: &str) {
        for content_type in content_types {
            if content_type.id == ASSET_CONTENT_TYPE {
                continue;
            }
            let definition = schema::model_definition(prefix, content_type);
            let mapper = SchemaMapper::new(prefix, content_type);
            tracing::debug!(
                content_type = %content_type.id,
                table = %definition.table,
                "Registering schema model"
            );
            self.register_default_model(content_type.id.clone(), move || definition.clone());
            self.register_default_mapper(content_type.id.clone(), move || {
                Box::new(mapper.clone())
            });
        }
    }

    /// Model for a content type
    pub fn resolve_model(&self, content_type: &str) -> Result<ModelDefinition> {
        self.application
            .models
            .get(content_type)
            .or_else(|| self.defaults.models.get(content_type))
            .map(|factory| factory())
            .ok_or_else(|| Error::UnknownModel(content_type.to_string()))
    }

    /// Mapper for a content type
    pub fn resolve_mapper(&self, content_type: &str) -> Result<Box<dyn EntryMapper>> {
        self.application
            .mappers
            .get(content_type)
            .or_else(|| self.defaults.mappers.get(content_type))
            .map(|factory| factory())
            .ok_or_else(|| Error::UnknownMapper(content_type.to_string()))
    }

    /// Content type ids with a model in either tier
    pub fn content_types(&self) -> BTreeSet<String> {
        self.application
            .models
            .keys()
            .chain(self.defaults.models.keys())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryPayload, MappedRecord, SqlType};
    use crate::schema::Field;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct FixedMapper;

    impl EntryMapper for FixedMapper {
        fn map(&self, payload: &EntryPayload, _locale: &str) -> Result<MappedRecord> {
            let mut record = MappedRecord::new(payload.id()?);
            record.set("title", json!("fixed"));
            Ok(record)
        }
    }

    fn article() -> ContentType {
        ContentType {
            id: "article".to_string(),
            name: "Article".to_string(),
            display_field: None,
            fields: vec![Field::new("title", "Symbol")],
        }
    }

    #[test]
    fn unknown_content_types_fail() {
        let registry = ModelRegistry::new();
        assert!(matches!(
            registry.resolve_model("widget"),
            Err(Error::UnknownModel(id)) if id == "widget"
        ));
        assert!(matches!(
            registry.resolve_mapper("widget"),
            Err(Error::UnknownMapper(id)) if id == "widget"
        ));
    }

    #[test]
    fn defaults_include_asset() {
        let registry = ModelRegistry::with_defaults("");
        assert_eq!(registry.resolve_model("asset").unwrap().table, "assets");
        assert!(registry.resolve_mapper("asset").is_ok());
        assert_eq!(
            registry.content_types().into_iter().collect::<Vec<_>>(),
            vec!["asset".to_string()]
        );
    }

    #[test]
    fn schema_registration_builds_defaults() {
        let mut registry = ModelRegistry::with_defaults("cf_");
        registry.register_schema(&[ContentType::asset(), article()], "cf_");

        let model = registry.resolve_model("article").unwrap();
        assert_eq!(model.table, "cf_articles");
        assert_eq!(model.name, "CfArticle");
        assert!(model.has_column("title"));
        assert!(registry.resolve_model("asset").unwrap().has_column("url"));
    }

    #[test]
    fn application_tier_overrides_defaults() {
        let mut registry = ModelRegistry::with_defaults("");
        registry.register_schema(&[article()], "");
        registry.register_model("article", || {
            ModelDefinition::new("Post", "posts").with_column("title", SqlType::Text)
        });
        registry.register_mapper("article", || Box::new(FixedMapper));

        assert_eq!(registry.resolve_model("article").unwrap().table, "posts");

        let payload: EntryPayload = serde_json::from_value(json!({
            "sys": {"id": "abc123"},
            "fields": {"title": {"en-US": "Hello"}}
        }))
        .unwrap();
        let record = registry
            .resolve_mapper("article")
            .unwrap()
            .map(&payload, "en-US")
            .unwrap();
        assert_eq!(record.fields["title"], json!("fixed"));
    }
}
