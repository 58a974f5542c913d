use std::io;

use contentful_core::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] contentful_core::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Payload is empty")]
    EmptyPayload,
    #[error("Generation failed for {0} content type(s)")]
    GenerationFailed(usize),
}
