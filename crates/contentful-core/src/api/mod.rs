//! Contentful Management API client.
//!
//! Content types drive model generation and the webhook server's registry.
//! Published entries and assets feed the `sync` backfill.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::EntryPayload;
use crate::schema::ContentTypeCollection;
use crate::util::{compact_text, is_http_url};

/// Default Management API base URL
pub const DEFAULT_MANAGEMENT_URL: &str = "https://api.contentful.com";

const CONTENT_TYPE_PAGE_LIMIT: usize = 1000;

/// Page size for published entries and assets
pub const ENTRY_PAGE_LIMIT: usize = 100;

/// Source of content type schemas
#[async_trait]
pub trait ManagementApi: Send + Sync {
    /// All content types of the configured space environment
    async fn content_types(&self) -> Result<ContentTypeCollection>;
}

/// Kind of published content listed by an `EntrySource`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Assets,
    Entries,
}

impl ContentKind {
    /// Collection path segment (`entries`, `assets`)
    pub const fn path(self) -> &'static str {
        match self {
            Self::Assets => "assets",
            Self::Entries => "entries",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Page of published entries or assets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryCollection {
    #[serde(default)]
    pub items: Vec<EntryPayload>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub skip: usize,
}

/// Source of published entries and assets, one page at a time
#[async_trait]
pub trait EntrySource: Send + Sync {
    /// Page of published content starting at `skip`
    async fn published(&self, kind: ContentKind, skip: usize) -> Result<EntryCollection>;
}

/// HTTP client for the Contentful Management API
#[derive(Clone)]
pub struct ContentfulManagementClient {
    base_url: String,
    space_id: String,
    environment: String,
    access_token: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for ContentfulManagementClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentfulManagementClient")
            .field("base_url", &self.base_url)
            .field("space_id", &self.space_id)
            .field("environment", &self.environment)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl ContentfulManagementClient {
    /// Builds a client for an explicit API base URL.
    pub fn new(
        base_url: impl Into<String>,
        space_id: impl Into<String>,
        environment: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        let base_url = normalize_base_url(&base_url.into())?;
        let space_id = space_id.into();
        if space_id.trim().is_empty() {
            return Err(Error::InvalidInput("space id must not be empty".into()));
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(|error| Error::RemoteApi(format!("Failed to construct HTTP client: {error}")))?;

        Ok(Self {
            base_url,
            space_id,
            environment: environment.into(),
            access_token: access_token.into(),
            client,
        })
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn environment_url(&self) -> String {
        format!(
            "{}/spaces/{}/environments/{}",
            self.base_url,
            urlencoding::encode(&self.space_id),
            urlencoding::encode(&self.environment)
        )
    }

    fn content_types_url(&self) -> String {
        format!("{}/content_types", self.environment_url())
    }

    fn published_url(&self, kind: ContentKind) -> String {
        format!("{}/public/{}", self.environment_url(), kind.path())
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        what: &str,
        skip: usize,
        limit: usize,
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(&[("skip", skip), ("limit", limit)])
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|error| Error::RemoteApi(format!("{what} request failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RemoteApi(format!(
                "{what} request failed with HTTP {status}: {}",
                compact_text(&body)
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|error| Error::RemoteApi(format!("Failed to parse {what} response: {error}")))
    }
}

#[async_trait]
impl ManagementApi for ContentfulManagementClient {
    async fn content_types(&self) -> Result<ContentTypeCollection> {
        let url = self.content_types_url();
        let mut collection = ContentTypeCollection::default();
        loop {
            let page: ContentTypeCollection = self
                .get_page(&url, "Content type", collection.items.len(), CONTENT_TYPE_PAGE_LIMIT)
                .await?;
            let fetched = page.items.len();
            collection.total = page.total;
            collection.items.extend(page.items);
            if fetched == 0 || collection.items.len() >= collection.total {
                break;
            }
        }

        if collection.items.len() < collection.total {
            tracing::warn!(
                fetched = collection.items.len(),
                total = collection.total,
                "Content type listing ended early"
            );
        }
        tracing::debug!(
            space = %self.space_id,
            environment = %self.environment,
            count = collection.items.len(),
            "Fetched content types"
        );
        Ok(collection)
    }
}

#[async_trait]
impl EntrySource for ContentfulManagementClient {
    async fn published(&self, kind: ContentKind, skip: usize) -> Result<EntryCollection> {
        let page: EntryCollection = self
            .get_page(&self.published_url(kind), "Published content", skip, ENTRY_PAGE_LIMIT)
            .await?;
        tracing::debug!(
            kind = %kind,
            skip,
            count = page.items.len(),
            total = page.total,
            "Fetched published content"
        );
        Ok(page)
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let base = raw.trim().trim_end_matches('/').to_string();
    if base.is_empty() {
        return Err(Error::InvalidInput(
            "Management API URL must not be empty".into(),
        ));
    }
    if !is_http_url(&base) {
        return Err(Error::InvalidInput(
            "Management API URL must include http:// or https://".into(),
        ));
    }
    Ok(base)
}
