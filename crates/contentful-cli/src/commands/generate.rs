use std::path::Path;

use contentful_core::config::ContentfulConfig;
use contentful_core::generator::{GenerationReport, Generator};

use crate::commands::common::load_content_types;
use crate::error::CliError;

pub async fn run_generate(
    config: &ContentfulConfig,
    schema: Option<&Path>,
    only: &[String],
) -> Result<(), CliError> {
    let report = generate(config, schema, only).await?;

    for path in &report.written {
        println!("{}", path.display());
    }
    for failure in &report.failures {
        eprintln!("{}: {}", failure.content_type, failure.error);
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::GenerationFailed(report.failures.len()))
    }
}

pub async fn generate(
    config: &ContentfulConfig,
    schema: Option<&Path>,
    only: &[String],
) -> Result<GenerationReport, CliError> {
    let mut content_types = load_content_types(config, schema).await?;
    if !only.is_empty() {
        content_types.retain(|content_type| only.contains(&content_type.id));
    }

    let generator = Generator::new(config.generator_config());
    Ok(generator.run(&content_types))
}
