//! Webhook actions and the effect each has on the mirror

use std::fmt;
use std::str::FromStr;

/// Action reported by a Contentful webhook
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WebhookAction {
    Create,
    Save,
    AutoSave,
    Archive,
    Unarchive,
    Publish,
    Unpublish,
    Delete,
    /// Any other action; dropped without error
    Unknown(String),
}

/// What the mirror does for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Upsert,
    Delete,
    Ignore,
}

impl WebhookAction {
    /// Parse an action name (`auto_save` and `autoSave` are both accepted)
    pub fn parse(action: &str) -> Self {
        match action.trim().to_ascii_lowercase().as_str() {
            "create" => Self::Create,
            "save" => Self::Save,
            "auto_save" | "autosave" => Self::AutoSave,
            "archive" => Self::Archive,
            "unarchive" => Self::Unarchive,
            "publish" => Self::Publish,
            "unpublish" => Self::Unpublish,
            "delete" => Self::Delete,
            _ => Self::Unknown(action.to_string()),
        }
    }

    /// Effect of the action on the mirror
    pub const fn effect(&self) -> Effect {
        match self {
            Self::Create | Self::Unarchive | Self::Publish => Effect::Upsert,
            Self::Archive | Self::Unpublish | Self::Delete => Effect::Delete,
            Self::Save | Self::AutoSave | Self::Unknown(_) => Effect::Ignore,
        }
    }

    /// Canonical action name
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "create",
            Self::Save => "save",
            Self::AutoSave => "auto_save",
            Self::Archive => "archive",
            Self::Unarchive => "unarchive",
            Self::Publish => "publish",
            Self::Unpublish => "unpublish",
            Self::Delete => "delete",
            Self::Unknown(action) => action,
        }
    }
}

impl FromStr for WebhookAction {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for WebhookAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
