//! Vector index access.
//!
//! The knowledge base lives in an external vector index reached over HTTP.
//! [`VectorIndex`] is the seam the pipeline depends on; [`HttpVectorIndex`]
//! speaks the Pinecone-style REST dialect (`/query`, `/vectors/upsert`,
//! `/describe_index_stats`) with an `Api-Key` header.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::embeddings::build_document_content;
use crate::error::RagError;
use crate::retry::RetryPolicy;
use crate::types::{Candidate, DocumentRecord};

/// Index-wide counters reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_vectors: u64,
    pub dimension: usize,
}

/// Query and ingest interface over the vector index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Nearest neighbours of `vector`, best first, scores in [0, 1].
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Candidate>, RagError>;

    /// Insert or overwrite documents with pre-computed embeddings. Returns
    /// how many the backend accepted.
    async fn upsert(&self, records: &[(DocumentRecord, Vec<f32>)]) -> Result<usize, RagError>;

    /// Current index counters.
    async fn stats(&self) -> Result<IndexStats, RagError>;
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: HashMap<String, Value>,
}

#[derive(Debug, Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a HashMap<String, Value>,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct UpsertResponse {
    #[serde(rename = "upsertedCount", default)]
    upserted_count: usize,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "totalVectorCount", default)]
    total_vector_count: u64,
    #[serde(default)]
    dimension: usize,
}

/// HTTP client for a Pinecone-style vector index.
pub struct HttpVectorIndex {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    namespace: Option<String>,
    retry: RetryPolicy,
}

impl HttpVectorIndex {
    pub fn new(endpoint: String, api_key: String, namespace: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            namespace,
            retry: RetryPolicy::default(),
        }
    }

    async fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, RagError> {
        let url = format!("{}/{path}", self.endpoint.trim_end_matches('/'));
        let response = self
            .retry
            .execute(|| {
                self.client
                    .post(&url)
                    .header("Api-Key", &self.api_key)
                    .json(body)
                    .send()
            })
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Index(format!("index API error {status}: {body}")));
        }
        Ok(response)
    }
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Candidate>, RagError> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            namespace: self.namespace.as_deref(),
        };

        let response = self.post("query", &request).await?;
        let parsed: QueryResponse = response.json().await?;

        log::debug!("index query k={top_k} returned {} matches", parsed.matches.len());

        Ok(parsed
            .matches
            .into_iter()
            .map(|hit| {
                let text = build_document_content(&hit.metadata);
                Candidate {
                    id: hit.id,
                    score: hit.score,
                    text,
                    metadata: hit.metadata,
                }
            })
            .collect())
    }

    async fn upsert(&self, records: &[(DocumentRecord, Vec<f32>)]) -> Result<usize, RagError> {
        if records.is_empty() {
            return Ok(0);
        }

        let request = UpsertRequest {
            vectors: records
                .iter()
                .map(|(record, values)| UpsertVector {
                    id: &record.id,
                    values,
                    metadata: &record.metadata,
                })
                .collect(),
            namespace: self.namespace.as_deref(),
        };

        let response = self.post("vectors/upsert", &request).await?;
        let parsed: UpsertResponse = response.json().await?;
        Ok(parsed.upserted_count)
    }

    async fn stats(&self) -> Result<IndexStats, RagError> {
        let response = self.post("describe_index_stats", &serde_json::json!({})).await?;
        let parsed: StatsResponse = response.json().await?;
        Ok(IndexStats {
            total_vectors: parsed.total_vector_count,
            dimension: parsed.dimension,
        })
    }
}
