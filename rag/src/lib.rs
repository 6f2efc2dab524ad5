//! firstline-rag: retrieval-augmented answering for medical queries.
//!
//! This crate provides the answer engine for firstline, including:
//! - Embedding generation via OpenAI/Ollama
//! - Vector search over an HTTP index
//! - Confidence tiers, widening retries and model-only fallback
//! - An emergency bypass that skips retrieval entirely
//!
//! # Example
//!
//! ```ignore
//! use firstline_rag::{RagConfig, RagPipeline, RagRequest};
//!
//! let pipeline = RagPipeline::new(embedder, index, completion, RagConfig::from_env());
//! let result = pipeline.handle_query(&RagRequest::new("s1", "how to treat a burn")).await?;
//! println!("{} [{:?}]", result.response, result.confidence_level);
//! ```

pub mod completion;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod prompt;
pub mod rerank;
pub mod retry;
pub mod safety;
pub mod store;
pub mod types;

pub use completion::{CompletionProvider, OpenRouterClient, TokenStream, DEFAULT_RESPONSE};
pub use config::{RagConfig, RerankStrategy};
pub use embeddings::{
    build_document_content, compute_content_hash, document_to_record, EmbeddingProvider,
    OllamaEmbeddings, OpenAiEmbeddings, EMBED_BATCH_LIMIT,
};
pub use error::RagError;
pub use index::{HttpVectorIndex, IndexStats, VectorIndex};
pub use pipeline::RagPipeline;
pub use rerank::rerank_candidates;
pub use retry::RetryPolicy;
pub use safety::{
    append_disclaimer, check_response_safety, sanitize_query, MAX_QUERY_LENGTH,
    MEDICAL_DISCLAIMER,
};
pub use store::{KeyValueStore, MemoryStore, RateLimiter};
pub use types::{
    Candidate, ChatMessage, CompletionOptions, ConfidenceLevel, DocumentRecord, FallbackReason,
    RagRequest, RagResult, ResponseLabel, SourceRef, MAX_SOURCE_EXCERPT,
};
