//! contentful-core - Core library for the Contentful mirror
//!
//! This crate contains the schema model, code generator, database layer, and
//! webhook synchronization pipeline shared by the CLI and the webhook server.

pub mod api;
pub mod caster;
pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod inflect;
pub mod mapper;
pub mod models;
pub mod registry;
pub mod schema;
pub mod services;
pub mod sync;
pub mod template;
pub mod util;

pub use error::{Error, Result};
pub use models::{EntryPayload, ModelDefinition, Record};
pub use registry::ModelRegistry;
