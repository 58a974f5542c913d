//! Model and mapper source generation.
//!
//! Each content type yields one model file and one mapper file, rendered
//! from `{{KEY}}` templates. Regeneration overwrites files unconditionally;
//! hand-written code belongs in the generated `custom` regions.

use std::fs;
use std::path::{Path, PathBuf};

use crate::api::ManagementApi;
use crate::error::{Error, Result};
use crate::inflect;
use crate::schema::{self, ContentType, FieldDefinition};
use crate::template::{Substitutions, Template};
use crate::util::is_sql_identifier;

const MODEL_STUB: &str = "model.stub";
const MAPPER_STUB: &str = "mapper.stub";

/// Where generated files go and which templates render them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Output directory for models
    pub model_dir: PathBuf,
    /// Output directory for mappers
    pub mapper_dir: PathBuf,
    /// Directory whose `model.stub` / `mapper.stub` replace the built-in ones
    pub template_dir: Option<PathBuf>,
    /// Prefix for every mirror table
    pub table_prefix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("src/models"),
            mapper_dir: PathBuf::from("src/mappers"),
            template_dir: None,
            table_prefix: String::new(),
        }
    }
}

/// One content type that could not be generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    pub content_type: String,
    pub error: String,
}

/// Outcome of a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Files written, in generation order
    pub written: Vec<PathBuf>,
    /// Content types that failed
    pub failures: Vec<GenerationFailure>,
}

impl GenerationReport {
    /// Whether every content type was generated
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetch all content types, with the synthetic asset type first
pub async fn list_content_types(api: &dyn ManagementApi) -> Result<Vec<ContentType>> {
    let collection = api.content_types().await?;
    let mut content_types = Vec::with_capacity(collection.items.len() + 1);
    content_types.push(ContentType::asset());
    content_types.extend(collection.items);
    Ok(content_types)
}

/// Renders and writes model and mapper files
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub const fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the mapper then the model of every content type.
    ///
    /// A failing content type is logged and recorded; the run continues.
    pub fn run(&self, content_types: &[ContentType]) -> GenerationReport {
        let mut report = GenerationReport::default();
        for content_type in content_types {
            let generated = self
                .generate_mapper(content_type)
                .and_then(|mapper| Ok((mapper, self.generate_model(content_type)?)));
            match generated {
                Ok((mapper, model)) => {
                    report.written.push(mapper);
                    report.written.push(model);
                }
                Err(error) => {
                    tracing::warn!(
                        content_type = %content_type.id,
                        "Failed to generate content type: {error}"
                    );
                    report.failures.push(GenerationFailure {
                        content_type: content_type.id.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }
        report
    }

    /// Write the model file of a content type, returning its path
    pub fn generate_model(&self, content_type: &ContentType) -> Result<PathBuf> {
        let source = self.render_model(content_type)?;
        let names = self.names(content_type)?;
        let path = self
            .config
            .model_dir
            .join(format!("{}.rs", names.file_stem));
        write_source(&path, &source)?;
        tracing::info!(content_type = %content_type.id, path = %path.display(), "Generated model");
        Ok(path)
    }

    /// Write the mapper file of a content type, returning its path
    pub fn generate_mapper(&self, content_type: &ContentType) -> Result<PathBuf> {
        let source = self.render_mapper(content_type)?;
        let names = self.names(content_type)?;
        let path = self
            .config
            .mapper_dir
            .join(format!("{}_mapper.rs", names.file_stem));
        write_source(&path, &source)?;
        tracing::info!(content_type = %content_type.id, path = %path.display(), "Generated mapper");
        Ok(path)
    }

    /// Model source for a content type
    pub fn render_model(&self, content_type: &ContentType) -> Result<String> {
        let names = self.names(content_type)?;
        let fields = schema::definitions(&names.table, &content_type.fields);

        let properties: String = fields
            .iter()
            .map(|field| format!("\n{}", field.model_property()))
            .collect();
        let columns: String = fields
            .iter()
            .filter_map(|field| {
                field.column_type().map(|sql_type| {
                    format!(
                        "\n            .with_column(\"{}\", {})",
                        field.column(),
                        sql_type.rust_path()
                    )
                })
            })
            .collect();
        let getters: String = fields.iter().map(FieldDefinition::model_getter).collect();

        let substitutions = Substitutions::new()
            .with("content_type", content_type.id.clone())
            .with("table", names.table.clone())
            .with("model", names.model.clone())
            .with("properties", properties)
            .with("columns", columns)
            .with("getters", getters);
        self.render(MODEL_STUB, &substitutions)
    }

    /// Mapper source for a content type
    pub fn render_mapper(&self, content_type: &ContentType) -> Result<String> {
        let names = self.names(content_type)?;
        let mappings: String = schema::definitions(&names.table, &content_type.fields)
            .iter()
            .map(FieldDefinition::mapper_statement)
            .collect();

        let substitutions = Substitutions::new()
            .with("content_type", content_type.id.clone())
            .with("table", names.table.clone())
            .with("model", names.model.clone())
            .with("mappings", mappings);
        self.render(MAPPER_STUB, &substitutions)
    }

    fn render(&self, stub: &str, substitutions: &Substitutions) -> Result<String> {
        let template = Template::parse(&self.stub(stub)?);
        let unresolved = template.unresolved(substitutions);
        if !unresolved.is_empty() {
            tracing::warn!(
                stub,
                placeholders = %unresolved.join(", "),
                "Leaving unresolved template placeholders"
            );
        }
        Ok(template.render(substitutions))
    }

    fn stub(&self, name: &str) -> Result<String> {
        if let Some(dir) = &self.config.template_dir {
            let path = dir.join(name);
            if path.is_file() {
                return fs::read_to_string(&path).map_err(|error| {
                    Error::Template(format!("failed to read {}: {error}", path.display()))
                });
            }
        }
        match name {
            MODEL_STUB => Ok(include_str!("../../templates/model.stub").to_string()),
            MAPPER_STUB => Ok(include_str!("../../templates/mapper.stub").to_string()),
            other => Err(Error::Template(format!("unknown template {other}"))),
        }
    }

    fn names(&self, content_type: &ContentType) -> Result<Names> {
        let table = inflect::table_name(&self.config.table_prefix, &content_type.id);
        let model = inflect::model_name(&self.config.table_prefix, &content_type.id);
        if !is_sql_identifier(&table) || !model.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidInput(format!(
                "content type id \"{}\" does not yield a valid table or model name",
                content_type.id
            )));
        }
        Ok(Names {
            file_stem: inflect::snake(&model),
            table,
            model,
        })
    }
}

struct Names {
    table: String,
    model: String,
    file_stem: String,
}

fn write_source(path: &Path, source: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, source)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ContentTypeCollection, Field};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    struct FakeApi {
        result: std::result::Result<Vec<ContentType>, String>,
    }

    #[async_trait]
    impl ManagementApi for FakeApi {
        async fn content_types(&self) -> Result<ContentTypeCollection> {
            match &self.result {
                Ok(items) => Ok(ContentTypeCollection {
                    total: items.len(),
                    items: items.clone(),
                }),
                Err(message) => Err(Error::RemoteApi(message.clone())),
            }
        }
    }

    fn blog_post() -> ContentType {
        let mut author = Field::new("author", "Link");
        author.link_type = Some("Entry".to_string());
        ContentType {
            id: "blogPost".to_string(),
            name: "Blog post".to_string(),
            display_field: Some("title".to_string()),
            fields: vec![
                Field::new("title", "Symbol"),
                Field::new("body", "Text"),
                Field::new("publishedAt", "Date"),
                author,
                Field::new("shape", "Hologram"),
            ],
        }
    }

    fn generator(root: &Path) -> Generator {
        Generator::new(GeneratorConfig {
            model_dir: root.join("models"),
            mapper_dir: root.join("mappers"),
            template_dir: None,
            table_prefix: String::new(),
        })
    }

    #[tokio::test]
    async fn lists_content_types_with_asset_first() {
        let api = FakeApi {
            result: Ok(vec![blog_post()]),
        };
        let content_types = list_content_types(&api).await.unwrap();
        let ids: Vec<&str> = content_types.iter().map(|ct| ct.id.as_str()).collect();
        assert_eq!(ids, vec!["asset", "blogPost"]);
    }

    #[tokio::test]
    async fn list_propagates_remote_errors() {
        let api = FakeApi {
            result: Err("HTTP 401".to_string()),
        };
        assert!(matches!(
            list_content_types(&api).await,
            Err(Error::RemoteApi(_))
        ));
    }

    #[test]
    fn renders_model_source() {
        let tmp = tempdir().unwrap();
        let source = generator(tmp.path()).render_model(&blog_post()).unwrap();

        assert!(source.contains("pub struct BlogPost {"));
        assert!(source.contains("pub const TABLE: &'static str = \"blog_posts\";"));
        assert!(source.contains(".with_column(\"title\", SqlType::Text)"));
        assert!(source.contains(".with_column(\"published_at\", SqlType::Timestamp)"));
        assert!(!source.contains(".with_column(\"author\""));
        assert!(source.contains("pub fn body(&self) -> String"));
        assert!(source.contains("pub async fn author<R: RelationWriter>"));
        assert!(source.contains("/// * `published_at` (PublishedAt): `Option<DateTime<Utc>>`"));
        assert!(!source.contains("shape"));
        assert!(!source.contains("{{"));
    }

    #[test]
    fn renders_mapper_source() {
        let tmp = tempdir().unwrap();
        let source = generator(tmp.path()).render_mapper(&blog_post()).unwrap();

        assert!(source.contains("pub struct BlogPostMapper;"));
        assert!(source.contains("impl EntryMapper for BlogPostMapper"));
        assert!(source.contains("FieldKind::Date.cast(payload.field(\"publishedAt\", locale))"));
        assert!(source.contains("record.relate("));
        assert!(!source.contains("{{"));
    }

    #[test]
    fn writes_files_and_overwrites() {
        let tmp = tempdir().unwrap();
        let generator = generator(tmp.path());

        let model = generator.generate_model(&blog_post()).unwrap();
        let mapper = generator.generate_mapper(&blog_post()).unwrap();
        assert_eq!(model, tmp.path().join("models").join("blog_post.rs"));
        assert_eq!(mapper, tmp.path().join("mappers").join("blog_post_mapper.rs"));

        fs::write(&model, "hand edited").unwrap();
        generator.generate_model(&blog_post()).unwrap();
        assert!(fs::read_to_string(&model)
            .unwrap()
            .contains("pub struct BlogPost"));
    }

    #[test]
    fn template_dir_overrides_stubs() {
        let tmp = tempdir().unwrap();
        let templates = tmp.path().join("templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(templates.join("model.stub"), "// {{MODEL}} in {{TABLE}} {{EXTRA}}\n").unwrap();

        let generator = Generator::new(GeneratorConfig {
            model_dir: tmp.path().join("models"),
            mapper_dir: tmp.path().join("mappers"),
            template_dir: Some(templates),
            table_prefix: "cf_".to_string(),
        });

        assert_eq!(
            generator.render_model(&blog_post()).unwrap(),
            "// CfBlogPost in cf_blog_posts {{EXTRA}}\n"
        );
        assert!(generator
            .render_mapper(&blog_post())
            .unwrap()
            .contains("pub struct CfBlogPostMapper;"));
    }

    #[test]
    fn run_continues_past_failures() {
        let tmp = tempdir().unwrap();
        let broken = ContentType {
            id: "9lives".to_string(),
            name: "Broken".to_string(),
            display_field: None,
            fields: Vec::new(),
        };

        let report = generator(tmp.path()).run(&[ContentType::asset(), broken, blog_post()]);

        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].content_type, "9lives");
        assert_eq!(report.written.len(), 4);
        assert!(tmp.path().join("models").join("asset.rs").is_file());
        assert!(tmp.path().join("mappers").join("blog_post_mapper.rs").is_file());
    }
}
