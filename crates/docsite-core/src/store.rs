//! Content stores: where documents come from.
//!
//! The index and the page lookup only ever read through [`ContentStore`].
//! Three implementations are provided:
//!
//! - [`MemoryStore`] holds documents in memory (tests, embedding)
//! - [`JsonFileStore`] reads a JSON export from disk on every call
//! - [`HttpStore`] queries a headless CMS over HTTP
//!
//! Stores never cache. Freshness of page lookups is the store's business,
//! and the search index snapshots whatever `fetch_all` returned when it was
//! built.

use crate::config::StoreConfig;
use crate::types::{Document, PageSummary};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const ALL_DOCUMENTS_QUERY: &str =
    r#"*[_type == "page"]{ _id, title, "slug": slug.current, pageType, metaDescription, content }"#;
const DOCUMENT_BY_SLUG_QUERY: &str = r#"*[_type == "page" && slug.current == $slug][0]{ _id, title, "slug": slug.current, pageType, metaDescription, content }"#;
const PAGE_LIST_QUERY: &str =
    r#"*[_type == "page"] | order(title asc){ _id, title, "slug": slug.current, pageType }"#;

/// Read access to the document corpus.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Every document, in store order.
    async fn fetch_all(&self) -> Result<Vec<Document>>;

    /// One document by slug, or `None` if no page has that slug.
    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<Document>>;

    /// Page summaries ordered by title.
    async fn list_pages(&self) -> Result<Vec<PageSummary>> {
        let mut pages: Vec<PageSummary> = self
            .fetch_all()
            .await?
            .iter()
            .map(Document::summary)
            .collect();
        pages.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(pages)
    }

    /// Slugs of every page, in store order.
    async fn all_slugs(&self) -> Result<Vec<String>> {
        Ok(self
            .fetch_all()
            .await?
            .into_iter()
            .map(|doc| doc.slug)
            .collect())
    }
}

/// Pick a store from configuration: a corpus file wins over an endpoint.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn ContentStore>> {
    if let Some(corpus) = &config.corpus {
        debug!("Using corpus file {}", corpus.display());
        return Ok(Arc::new(JsonFileStore::new(corpus)));
    }

    if config.endpoint.is_some() {
        return Ok(Arc::new(HttpStore::new(config)?));
    }

    Err(Error::Config(
        "No content store configured: set store.corpus or store.endpoint".into(),
    ))
}

/// Documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Vec<Document>,
}

impl MemoryStore {
    /// Store over a fixed set of documents.
    pub const fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<Document>> {
        Ok(self.documents.clone())
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<Document>> {
        Ok(self.documents.iter().find(|doc| doc.slug == slug).cloned())
    }
}

/// A corpus exported to a JSON file.
///
/// The file holds either an array of documents or a query response of the
/// form `{ "result": [...] }`. It is re-read on every call, so edits show up
/// without restarting.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    Documents(Vec<Document>),
    Envelope { result: Vec<Document> },
}

impl JsonFileStore {
    /// Store reading `path` on every call.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Corpus file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Vec<Document>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let corpus: CorpusFile = serde_json::from_str(&content).map_err(|e| {
            Error::Parse(format!("Invalid corpus file {}: {e}", self.path.display()))
        })?;

        let documents = match corpus {
            CorpusFile::Documents(documents) | CorpusFile::Envelope { result: documents } => {
                documents
            },
        };
        debug!(
            "Read {} documents from {}",
            documents.len(),
            self.path.display()
        );
        Ok(documents)
    }
}

#[async_trait]
impl ContentStore for JsonFileStore {
    async fn fetch_all(&self) -> Result<Vec<Document>> {
        self.read().await
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<Document>> {
        Ok(self.read().await?.into_iter().find(|doc| doc.slug == slug))
    }
}

/// A headless CMS exposing a query endpoint.
///
/// Requests go to `{endpoint}/v{api_version}/data/query/{dataset}` with the
/// query in the `query` parameter; the response body carries the data under
/// `result`.
pub struct HttpStore {
    client: Client,
    query_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct QueryResponse<T> {
    result: Option<T>,
}

impl HttpStore {
    /// Build a store from configuration; `endpoint` must be set.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| Error::Config("store.endpoint is not set".into()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("docsite/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            client,
            query_url: format!(
                "{}/v{}/data/query/{}",
                endpoint.trim_end_matches('/'),
                config.api_version,
                config.dataset
            ),
            token: config.token.clone(),
        })
    }

    /// Fully resolved query URL.
    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>> {
        let mut request = self.client.get(&self.query_url).query(&[("query", query)]);
        for (name, value) in params {
            // query parameters are JSON-encoded and prefixed with `$`
            let encoded = serde_json::to_string(value)?;
            request = request.query(&[(format!("${name}"), encoded)]);
        }
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            if status == StatusCode::NOT_FOUND {
                return Err(Error::NotFound(format!(
                    "Query endpoint not found at '{}'. Check store.endpoint and store.dataset",
                    self.query_url
                )));
            }

            return Err(match response.error_for_status() {
                Ok(_) => Error::Store(format!("Unexpected status {status}")),
                Err(err) => Error::Network(err),
            });
        }

        let body = response.text().await?;
        info!("Fetched {} bytes from {}", body.len(), self.query_url);

        let parsed: QueryResponse<T> = serde_json::from_str(&body)
            .map_err(|e| Error::Store(format!("Unexpected query response: {e}")))?;
        Ok(parsed.result)
    }
}

#[async_trait]
impl ContentStore for HttpStore {
    async fn fetch_all(&self) -> Result<Vec<Document>> {
        Ok(self
            .query(ALL_DOCUMENTS_QUERY, &[])
            .await?
            .unwrap_or_default())
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<Document>> {
        self.query(DOCUMENT_BY_SLUG_QUERY, &[("slug", slug.to_string())])
            .await
    }

    async fn list_pages(&self) -> Result<Vec<PageSummary>> {
        Ok(self.query(PAGE_LIST_QUERY, &[]).await?.unwrap_or_default())
    }
}
