pub mod apply;
pub mod common;
pub mod completions;
pub mod content_types;
pub mod generate;
pub mod migrate;
pub mod records;
pub mod sync;
