//! Pipeline tuning knobs.
//!
//! Thresholds partition the retrieval score space: at or above `high` the
//! answer is grounded, at or above `partial` partially grounded, at or above
//! `fallback` low grounded, and below `fallback` the pipeline abandons the
//! sources entirely. Values come from the environment with sane defaults, so
//! a deployment can tighten or loosen grounding without a rebuild.

use serde::{Deserialize, Serialize};

/// Which backend scores candidates during reranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerankStrategy {
    Llm,
    Embedding,
}

/// Tuning knobs for retrieval depth, grounding thresholds and reranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    pub threshold_high: f32,
    pub threshold_partial: f32,
    pub threshold_fallback: f32,
    pub rerank_enabled: bool,
    pub rerank_strategy: RerankStrategy,
    /// How many candidates survive into the prompt context.
    pub rerank_top_k: usize,
    /// How many sources a request asks for when it does not say.
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            threshold_high: 0.80,
            threshold_partial: 0.70,
            threshold_fallback: 0.60,
            rerank_enabled: false,
            rerank_strategy: RerankStrategy::Llm,
            rerank_top_k: 3,
            top_k: 5,
        }
    }
}

impl RagConfig {
    /// Read the `RAG_*` environment variables, falling back to defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            threshold_high: parse_f32(
                std::env::var("RAG_THRESHOLD_HIGH").ok().as_deref(),
                defaults.threshold_high,
            ),
            threshold_partial: parse_f32(
                std::env::var("RAG_THRESHOLD_PARTIAL").ok().as_deref(),
                defaults.threshold_partial,
            ),
            threshold_fallback: parse_f32(
                std::env::var("RAG_THRESHOLD_FALLBACK").ok().as_deref(),
                defaults.threshold_fallback,
            ),
            rerank_enabled: parse_bool(
                std::env::var("RAG_RERANK_ENABLED").ok().as_deref(),
                defaults.rerank_enabled,
            ),
            rerank_strategy: parse_strategy(
                std::env::var("RAG_RERANK_STRATEGY").ok().as_deref(),
                defaults.rerank_strategy,
            ),
            rerank_top_k: parse_usize(
                std::env::var("RAG_RERANK_TOP_K").ok().as_deref(),
                defaults.rerank_top_k,
            ),
            top_k: parse_usize(std::env::var("RAG_TOP_K").ok().as_deref(), defaults.top_k),
        }
    }
}

fn parse_f32(raw: Option<&str>, default: f32) -> f32 {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(default)
}

fn parse_usize(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(default)
}

fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(|value| value.trim().to_lowercase()) {
        Some(value) if value == "true" || value == "1" => true,
        Some(value) if value == "false" || value == "0" => false,
        _ => default,
    }
}

fn parse_strategy(raw: Option<&str>, default: RerankStrategy) -> RerankStrategy {
    match raw.map(|value| value.trim().to_lowercase()) {
        Some(value) if value == "llm" => RerankStrategy::Llm,
        Some(value) if value == "embedding" => RerankStrategy::Embedding,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_order_thresholds() {
        let config = RagConfig::default();
        assert!(config.threshold_high > config.threshold_partial);
        assert!(config.threshold_partial > config.threshold_fallback);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.rerank_top_k, 3);
        assert!(!config.rerank_enabled);
    }

    #[test]
    fn test_parse_f32_rejects_garbage() {
        assert_eq!(parse_f32(Some("0.85"), 0.80), 0.85);
        assert_eq!(parse_f32(Some("not a number"), 0.80), 0.80);
        assert_eq!(parse_f32(None, 0.80), 0.80);
    }

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert!(parse_bool(Some("true"), false));
        assert!(parse_bool(Some("1"), false));
        assert!(!parse_bool(Some("false"), true));
        assert!(!parse_bool(Some("0"), true));
        assert!(parse_bool(Some("yes?"), true));
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!(
            parse_strategy(Some("embedding"), RerankStrategy::Llm),
            RerankStrategy::Embedding
        );
        assert_eq!(
            parse_strategy(Some("LLM"), RerankStrategy::Embedding),
            RerankStrategy::Llm
        );
        assert_eq!(
            parse_strategy(Some("mystery"), RerankStrategy::Llm),
            RerankStrategy::Llm
        );
    }
}
