//! # Provider Construction
//!
//! Builds the answer pipeline's provider seams from the CLI configuration.
//! Each builder names the missing section in its error so commands can point
//! the user at the right `firstline config` invocation.

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};

use firstline_rag::{
    CompletionProvider, EmbeddingProvider, HttpVectorIndex, OllamaEmbeddings, OpenAiEmbeddings,
    OpenRouterClient, RagConfig, RagPipeline, VectorIndex,
};

use crate::config::Config;

/// Build the embedding provider from configuration
pub fn build_embedder(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    let embedding = config.embedding.as_ref().ok_or_else(|| {
        anyhow!("no embedding provider configured; run `firstline config embedding openai` or `firstline config embedding ollama`")
    })?;

    match embedding.provider.as_str() {
        "openai" => {
            let api_key = embedding.get_api_key().ok_or_else(|| {
                anyhow!(
                    "OpenAI API key not found; set the {} environment variable",
                    embedding.api_key_env.as_deref().unwrap_or("OPENAI_API_KEY")
                )
            })?;
            Ok(Arc::new(OpenAiEmbeddings::new(
                api_key,
                embedding.model.clone(),
                embedding.endpoint.clone(),
                embedding.dimensions,
            )))
        }
        "ollama" => Ok(Arc::new(OllamaEmbeddings::new(
            embedding.model.clone(),
            embedding.endpoint.clone(),
            embedding.dimensions,
        ))),
        other => bail!("unknown embedding provider: {other}"),
    }
}

/// Build the completion provider from configuration
pub fn build_completion(config: &Config) -> Result<Arc<dyn CompletionProvider>> {
    let completion = config.completion.as_ref().ok_or_else(|| {
        anyhow!("no completion provider configured; run `firstline config completion --model <MODEL>`")
    })?;

    let api_key = completion.get_api_key().ok_or_else(|| {
        anyhow!(
            "completion API key not found; set the {} environment variable",
            completion
                .api_key_env
                .as_deref()
                .unwrap_or("OPENROUTER_API_KEY")
        )
    })?;

    Ok(Arc::new(OpenRouterClient::new(
        api_key,
        completion.model.clone(),
        completion.endpoint.clone(),
    )))
}

/// Build the vector index client from configuration
pub fn build_index(config: &Config) -> Result<Arc<dyn VectorIndex>> {
    let index = config.index.as_ref().ok_or_else(|| {
        anyhow!("no vector index configured; run `firstline config index --endpoint <URL>`")
    })?;

    Ok(Arc::new(HttpVectorIndex::new(
        index.endpoint.clone(),
        index.get_api_key().unwrap_or_default(),
        index.namespace.clone(),
    )))
}

/// Build the full answer pipeline from configuration
///
/// Pipeline tuning (thresholds, rerank, retrieval depth) comes from the
/// `RAG_*` environment variables.
pub fn build_pipeline(config: &Config) -> Result<RagPipeline> {
    let embedder = build_embedder(config)?;
    let index = build_index(config)?;
    let completion = build_completion(config)?;
    Ok(RagPipeline::new(
        embedder,
        index,
        completion,
        RagConfig::from_env(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompletionConfig, EmbeddingConfig, IndexConfig};

    #[test]
    fn test_build_embedder_requires_section() {
        let config = Config::default();
        let err = build_embedder(&config).err().unwrap();
        assert!(err.to_string().contains("no embedding provider"));
    }

    #[test]
    fn test_build_embedder_ollama_needs_no_key() {
        let mut config = Config::default();
        config.embedding = Some(EmbeddingConfig::ollama(
            "http://localhost:11434",
            "nomic-embed-text",
        ));
        let embedder = build_embedder(&config).unwrap();
        assert_eq!(embedder.model_name(), "nomic-embed-text");
        assert_eq!(embedder.dimensions(), 768);
    }

    #[test]
    fn test_build_embedder_rejects_unknown_provider() {
        let mut config = Config::default();
        let mut embedding = EmbeddingConfig::openai("text-embedding-3-small");
        embedding.provider = "mystery".to_string();
        config.embedding = Some(embedding);
        let err = build_embedder(&config).err().unwrap();
        assert!(err.to_string().contains("unknown embedding provider"));
    }

    #[test]
    fn test_build_completion_requires_key() {
        let mut config = Config::default();
        let mut completion = CompletionConfig::openrouter("openai/gpt-4o-mini");
        completion.api_key_env = Some("FIRSTLINE_TEST_MISSING_KEY".to_string());
        config.completion = Some(completion);
        let err = build_completion(&config).err().unwrap();
        assert!(err.to_string().contains("FIRSTLINE_TEST_MISSING_KEY"));
    }

    #[test]
    fn test_build_completion_with_stored_key() {
        let mut config = Config::default();
        let mut completion = CompletionConfig::openrouter("openai/gpt-4o-mini");
        completion.api_key = Some("stored".to_string());
        completion.api_key_env = None;
        config.completion = Some(completion);
        let provider = build_completion(&config).unwrap();
        assert_eq!(provider.model_name(), "openai/gpt-4o-mini");
    }

    #[test]
    fn test_build_index_without_key_uses_empty() {
        let mut config = Config::default();
        let mut index = IndexConfig::new("https://index.example.com");
        index.api_key_env = None;
        config.index = Some(index);
        assert!(build_index(&config).is_ok());
    }
}
