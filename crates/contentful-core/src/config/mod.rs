//! Environment configuration shared by the CLI and the webhook server

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::api::{ContentfulManagementClient, DEFAULT_MANAGEMENT_URL};
use crate::db::DatabaseOptions;
use crate::generator::GeneratorConfig;
use crate::util::{is_http_url, is_sql_identifier, normalize_text_option};

pub const DEFAULT_ENVIRONMENT: &str = "master";
pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_DATABASE_PATH: &str = "contentful.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct ContentfulConfig {
    pub space_id: Option<String>,
    pub environment: String,
    pub management_token: Option<String>,
    pub management_url: String,
    pub default_locale: String,
    pub table_prefix: String,
    pub database_path: PathBuf,
    pub run_migrations: bool,
    pub model_dir: PathBuf,
    pub mapper_dir: PathBuf,
    pub template_dir: Option<PathBuf>,
}

impl fmt::Debug for ContentfulConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ContentfulConfig")
            .field("space_id", &self.space_id)
            .field("environment", &self.environment)
            .field(
                "management_token",
                &self.management_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("management_url", &self.management_url)
            .field("default_locale", &self.default_locale)
            .field("table_prefix", &self.table_prefix)
            .field("database_path", &self.database_path)
            .field("run_migrations", &self.run_migrations)
            .field("model_dir", &self.model_dir)
            .field("mapper_dir", &self.mapper_dir)
            .field("template_dir", &self.template_dir)
            .finish()
    }
}

impl Default for ContentfulConfig {
    fn default() -> Self {
        let generator = GeneratorConfig::default();
        Self {
            space_id: None,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            management_token: None,
            management_url: DEFAULT_MANAGEMENT_URL.to_string(),
            default_locale: DEFAULT_LOCALE.to_string(),
            table_prefix: String::new(),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            run_migrations: true,
            model_dir: generator.model_dir,
            mapper_dir: generator.mapper_dir,
            template_dir: None,
        }
    }
}

impl ContentfulConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let value = |name: &str| normalize_text_option(lookup(name));

        let management_url = value("CONTENTFUL_MANAGEMENT_URL")
            .map_or(defaults.management_url, |url| {
                url.trim_end_matches('/').to_string()
            });
        if !is_http_url(&management_url) {
            return Err(ConfigError::Invalid(
                "CONTENTFUL_MANAGEMENT_URL must start with http:// or https://".to_string(),
            ));
        }

        // An explicitly empty prefix is allowed, so the raw value is used here.
        let table_prefix = lookup("CONTENTFUL_TABLE_PREFIX")
            .map(|prefix| prefix.trim().to_string())
            .unwrap_or_default();
        if !table_prefix.is_empty() && !is_sql_identifier(&table_prefix) {
            return Err(ConfigError::Invalid(format!(
                "CONTENTFUL_TABLE_PREFIX must be a valid SQL identifier, got {table_prefix:?}"
            )));
        }

        let run_migrations = match value("CONTENTFUL_RUN_MIGRATIONS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ConfigError::Invalid(
                    "CONTENTFUL_RUN_MIGRATIONS must be one of true, false, 1, 0".to_string(),
                )
            })?,
            None => defaults.run_migrations,
        };

        Ok(Self {
            space_id: value("CONTENTFUL_SPACE_ID"),
            environment: value("CONTENTFUL_ENVIRONMENT").unwrap_or(defaults.environment),
            management_token: value("CONTENTFUL_MANAGEMENT_TOKEN"),
            management_url,
            default_locale: value("CONTENTFUL_DEFAULT_LOCALE").unwrap_or(defaults.default_locale),
            table_prefix,
            database_path: value("CONTENTFUL_DATABASE_PATH")
                .map_or(defaults.database_path, PathBuf::from),
            run_migrations,
            model_dir: value("CONTENTFUL_MODEL_DIR").map_or(defaults.model_dir, PathBuf::from),
            mapper_dir: value("CONTENTFUL_MAPPER_DIR").map_or(defaults.mapper_dir, PathBuf::from),
            template_dir: value("CONTENTFUL_TEMPLATE_DIR").map(PathBuf::from),
        })
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            model_dir: self.model_dir.clone(),
            mapper_dir: self.mapper_dir.clone(),
            template_dir: self.template_dir.clone(),
            table_prefix: self.table_prefix.clone(),
        }
    }

    pub const fn database_options(&self) -> DatabaseOptions {
        DatabaseOptions {
            run_migrations: self.run_migrations,
        }
    }

    /// Management API client; requires the space id and token.
    pub fn management_client(&self) -> Result<ContentfulManagementClient, ConfigError> {
        let space_id = self
            .space_id
            .as_deref()
            .ok_or(ConfigError::MissingVar("CONTENTFUL_SPACE_ID"))?;
        let token = self
            .management_token
            .as_deref()
            .ok_or(ConfigError::MissingVar("CONTENTFUL_MANAGEMENT_TOKEN"))?;

        ContentfulManagementClient::new(&self.management_url, space_id, &self.environment, token)
            .map_err(|error| ConfigError::Invalid(error.to_string()))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
