//! Embedding providers for generating vector representations of text.
//!
//! Supports OpenAI-compatible APIs (including Ollama) for embedding
//! generation, plus the content builders that decide what text a
//! knowledge-base entry contributes.

mod content;
mod provider;

pub use content::{build_document_content, compute_content_hash, document_to_record};
pub use provider::{
    EmbeddingProvider, OllamaEmbeddings, OpenAiEmbeddings, EMBED_BATCH_LIMIT,
};
