//! Destination search against the hosted index
//!
//! [`SearchGateway`] is the only entry point the rest of the crate uses. It
//! issues a query with a fixed attribute projection and turns the response,
//! or any transport failure, into a [`SearchOutcome`]. The HTTP side sits
//! behind the [`SearchBackend`] trait so conversations can be driven by a
//! stand-in index.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::config::{EcoVoyageConfig, SearchConfig};
use crate::models::{DESTINATION_ATTRIBUTES, Destination};
use crate::normalize;
use crate::{EcoVoyageError, Result};

/// Attributes requested for autocomplete suggestions
pub const SUGGESTION_ATTRIBUTES: &[&str] = &["name", "country", "region"];

const SLOW_SEARCH: Duration = Duration::from_secs(2);

/// One query against one index
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub index_name: String,
    pub query: String,
    pub hits_per_page: u32,
    pub attributes_to_retrieve: Vec<String>,
}

/// Something that can execute a [`SearchRequest`] and hand back raw hits
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn query(&self, request: &SearchRequest) -> Result<Vec<Value>>;
}

/// HTTP client for the hosted search service
pub struct AlgoliaClient {
    client: Client,
    base_url: String,
    app_id: String,
    api_key: String,
}

#[derive(Serialize)]
struct MultiQueryRequest<'a> {
    requests: [&'a SearchRequest; 1],
}

#[derive(Debug, Deserialize)]
struct MultiQueryResponse {
    #[serde(default)]
    results: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    hits: Vec<Value>,
}

impl AlgoliaClient {
    /// Create a new client. No timeout is set unless configured.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("EcoVoyage/", env!("CARGO_PKG_VERSION")));
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| EcoVoyageError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            app_id: config.app_id.clone(),
            api_key: config.search_key.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SearchBackend for AlgoliaClient {
    #[instrument(name = "index_query", skip(self, request), fields(index = %request.index_name, query = %request.query))]
    async fn query(&self, request: &SearchRequest) -> Result<Vec<Value>> {
        let url = format!("{}/1/indexes/*/queries", self.base_url);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("X-Algolia-Application-Id", &self.app_id)
            .header("X-Algolia-API-Key", &self.api_key)
            .json(&MultiQueryRequest {
                requests: [request],
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EcoVoyageError::search(format!(
                "search service returned {status}: {}",
                body.trim()
            )));
        }

        let parsed: MultiQueryResponse = response.json().await.map_err(|e| {
            EcoVoyageError::parse(format!("Failed to decode search response: {e}"))
        })?;

        Ok(parsed
            .results
            .into_iter()
            .next()
            .map(|result| result.hits)
            .unwrap_or_default())
    }
}

/// Records found for a query. A failed search has no records and an error
/// text instead of raising.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub records: Vec<Destination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reduced destination shown while typing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub name: String,
    pub country: String,
    pub region: String,
}

impl Suggestion {
    #[must_use]
    pub fn from_hit(hit: &Value) -> Self {
        Self {
            name: normalize::text_or(hit, "name", normalize::UNNAMED_DESTINATION),
            country: normalize::text(hit, "country"),
            region: normalize::text(hit, "region"),
        }
    }
}

pub struct SearchGateway {
    backend: Arc<dyn SearchBackend>,
    index_name: String,
    hits_per_page: u32,
    suggestion_limit: u32,
}

impl SearchGateway {
    #[must_use]
    pub fn new(backend: Arc<dyn SearchBackend>, config: &EcoVoyageConfig) -> Self {
        Self {
            backend,
            index_name: config.search.index_name.clone(),
            hits_per_page: config.search.hits_per_page,
            suggestion_limit: config.autocomplete.limit,
        }
    }

    /// Gateway talking to the hosted index described by `config`
    pub fn from_config(config: &EcoVoyageConfig) -> Result<Self> {
        let client = AlgoliaClient::new(&config.search)?;
        info!("Using search index '{}' at {}", config.search.index_name, client.base_url());
        Ok(Self::new(Arc::new(client), config))
    }

    fn request(&self, query: &str, limit: u32, attributes: &[&str]) -> SearchRequest {
        SearchRequest {
            index_name: self.index_name.clone(),
            query: query.to_string(),
            hits_per_page: limit,
            attributes_to_retrieve: attributes.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    /// Full destination search. Never fails: errors are folded into the
    /// outcome. No retry.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let request = self.request(query, self.hits_per_page, DESTINATION_ATTRIBUTES);
        let started = Instant::now();

        match self.backend.query(&request).await {
            Ok(hits) => {
                let records: Vec<Destination> = hits.iter().map(Destination::from_hit).collect();
                let elapsed = started.elapsed();
                info!(
                    "Search for '{}' returned {} destinations in {:.3}s",
                    query,
                    records.len(),
                    elapsed.as_secs_f64()
                );
                if elapsed > SLOW_SEARCH {
                    warn!("Slow search response: {:.3}s", elapsed.as_secs_f64());
                }
                SearchOutcome {
                    records,
                    error: None,
                }
            }
            Err(e) => {
                warn!("Search for '{}' failed: {}", query, e);
                SearchOutcome {
                    records: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Name/country/region of the first few matches for `prefix`
    pub async fn suggest(&self, prefix: &str) -> Result<Vec<Suggestion>> {
        let request = self.request(prefix, self.suggestion_limit, SUGGESTION_ATTRIBUTES);
        let hits = self.backend.query(&request).await?;
        Ok(hits
            .iter()
            .take(self.suggestion_limit as usize)
            .map(Suggestion::from_hit)
            .collect())
    }
}
