use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "contentful")]
#[command(about = "Mirror Contentful content types and entries into SQL tables")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the mirror database (overrides CONTENTFUL_DATABASE_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Read content types from a JSON file instead of the Management API
    #[arg(long, global = true, value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Locale to read entry fields in (overrides CONTENTFUL_DEFAULT_LOCALE)
    #[arg(long, global = true, value_name = "LOCALE")]
    pub locale: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate model and mapper files for content types
    Generate {
        /// Only generate these content type ids
        #[arg(long = "only", value_name = "ID")]
        only: Vec<String>,
        /// Directory for model files (overrides CONTENTFUL_MODEL_DIR)
        #[arg(long, value_name = "PATH")]
        model_dir: Option<PathBuf>,
        /// Directory for mapper files (overrides CONTENTFUL_MAPPER_DIR)
        #[arg(long, value_name = "PATH")]
        mapper_dir: Option<PathBuf>,
    },
    /// List content types of the space
    #[command(name = "content-types")]
    ContentTypes {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create or upgrade the mirror database
    Migrate,
    /// Apply one webhook payload to the mirror
    Apply {
        /// Webhook action (create, save, auto_save, archive, unarchive, publish, unpublish, delete)
        #[arg(long, value_name = "ACTION")]
        action: String,
        /// Payload file (stdin when omitted)
        #[arg(long, value_name = "PATH")]
        payload: Option<PathBuf>,
    },
    /// Show mirrored rows of a content type
    Records {
        /// Content type id
        content_type: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load every published entry and asset into the mirror
    Sync {
        /// Read entries and assets from a `contentful space export` file
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
