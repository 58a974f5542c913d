use std::collections::HashMap;
use std::env;
use std::fmt;

use contentful_core::config::{ConfigError, ContentfulConfig};
use contentful_core::util::normalize_text_option;

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub webhook_secret: Option<String>,
    pub contentful: ContentfulConfig,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("contentful", &self.contentful)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = normalize_text_option(lookup("CONTENTFUL_WEBHOOK_BIND_ADDR"))
            .unwrap_or_else(|| "127.0.0.1:8080".to_string());
        if bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "CONTENTFUL_WEBHOOK_BIND_ADDR must be a socket address, got {bind_addr:?}"
            )));
        }

        let contentful = ContentfulConfig::from_lookup(&lookup)?;
        if contentful.space_id.is_none() {
            return Err(ConfigError::MissingVar("CONTENTFUL_SPACE_ID"));
        }
        if contentful.management_token.is_none() {
            return Err(ConfigError::MissingVar("CONTENTFUL_MANAGEMENT_TOKEN"));
        }

        Ok(Self {
            bind_addr,
            webhook_secret: normalize_text_option(lookup("CONTENTFUL_WEBHOOK_SECRET")),
            contentful,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(map: &HashMap<&str, &str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn config_requires_management_credentials() {
        let map: HashMap<&str, &str> = HashMap::new();
        let err = config_from(&map).unwrap_err();
        assert!(err.to_string().contains("CONTENTFUL_SPACE_ID"));
    }

    #[test]
    fn config_rejects_invalid_bind_addr() {
        let map = HashMap::from([
            ("CONTENTFUL_SPACE_ID", "space"),
            ("CONTENTFUL_MANAGEMENT_TOKEN", "token"),
            ("CONTENTFUL_WEBHOOK_BIND_ADDR", "localhost"),
        ]);
        let err = config_from(&map).unwrap_err();
        assert!(err.to_string().contains("CONTENTFUL_WEBHOOK_BIND_ADDR"));
    }

    #[test]
    fn config_redacts_sensitive_debug_fields() {
        let map = HashMap::from([
            ("CONTENTFUL_SPACE_ID", "space"),
            ("CONTENTFUL_MANAGEMENT_TOKEN", "sensitive-cma-token"),
            ("CONTENTFUL_WEBHOOK_SECRET", "sensitive-webhook-secret"),
        ]);

        let config = config_from(&map).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");

        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("sensitive-cma-token"));
        assert!(!debug_output.contains("sensitive-webhook-secret"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
