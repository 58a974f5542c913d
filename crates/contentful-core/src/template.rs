//! `{{KEY}}` placeholder templates used by the code generator.
//!
//! A template is tokenized once into literal and placeholder segments.
//! Rendering looks keys up case-insensitively and never rescans substituted
//! text, so a value containing `{{OTHER}}` is emitted verbatim.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([A-Za-z][A-Za-z0-9_]*)\}\}").expect("Invalid placeholder regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder { key: String, raw: String },
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

/// Named values for template placeholders; keys are stored uppercased
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    values: BTreeMap<String, String>,
}

impl Substitutions {
    /// Create an empty set of substitutions
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value (builder style)
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a value
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_uppercase(), value.into());
    }

    /// Look a value up by key, ignoring case
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_uppercase()).map(String::as_str)
    }
}

impl Template {
    /// Tokenize a template source
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut cursor = 0;

        for captures in PLACEHOLDER.captures_iter(source) {
            let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if whole.start() > cursor {
                segments.push(Segment::Literal(source[cursor..whole.start()].to_string()));
            }
            segments.push(Segment::Placeholder {
                key: key.as_str().to_uppercase(),
                raw: whole.as_str().to_string(),
            });
            cursor = whole.end();
        }
        if cursor < source.len() {
            segments.push(Segment::Literal(source[cursor..].to_string()));
        }

        Self { segments }
    }

    /// Uppercased keys referenced by the template
    pub fn placeholders(&self) -> BTreeSet<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder { key, .. } => Some(key.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Render, leaving unresolved placeholders verbatim
    pub fn render(&self, substitutions: &Substitutions) -> String {
        let mut rendered = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder { key, raw } => {
                    rendered.push_str(substitutions.get(key).unwrap_or(raw.as_str()));
                }
            }
        }
        rendered
    }

    /// Render, failing when any placeholder has no value
    pub fn render_strict(&self, substitutions: &Substitutions) -> Result<String> {
        let missing = self.unresolved(substitutions);
        if !missing.is_empty() {
            return Err(Error::Template(format!(
                "unresolved placeholders: {}",
                missing.join(", ")
            )));
        }
        Ok(self.render(substitutions))
    }

    /// Keys referenced by the template that have no value
    pub fn unresolved(&self, substitutions: &Substitutions) -> Vec<&str> {
        self.placeholders()
            .into_iter()
            .filter(|key| substitutions.get(key).is_none())
            .collect()
    }
}
