//! Request and result types shared across the pipeline.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use firstline_triage::EmergencyDetection;

/// Longest source excerpt carried on a result.
pub const MAX_SOURCE_EXCERPT: usize = 200;

/// A knowledge-base match returned by the vector index, similarity score in
/// [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub score: f32,
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A document prepared for indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Confidence tier derived from the top retrieval score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Partial,
    Low,
    Fallback,
    Emergency,
}

/// How the answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLabel {
    Grounded,
    PartiallyGrounded,
    LowGrounded,
    ModelFallback,
    EmergencyBypass,
}

/// Why the pipeline abandoned retrieved sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoRetrieval,
    LowConfidence,
}

/// One answer request.
#[derive(Debug, Clone)]
pub struct RagRequest {
    pub session_id: String,
    pub query: String,
    /// Verdict from the triage layer, if any. Shapes prompts and sampling.
    pub emergency: Option<EmergencyDetection>,
    /// Overrides the configured retrieval depth.
    pub top_k: Option<usize>,
}

impl RagRequest {
    pub fn new(session_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            query: query.into(),
            emergency: None,
            top_k: None,
        }
    }
}

/// Source citation attached to an answer, text capped at
/// [`MAX_SOURCE_EXCERPT`] characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: String,
    pub score: f32,
    pub text: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SourceRef {
    /// Citation for a normal-path source; long text gains an ellipsis.
    pub fn from_candidate(candidate: &Candidate) -> Self {
        let text = if candidate.text.chars().count() > MAX_SOURCE_EXCERPT {
            let mut excerpt: String = candidate.text.chars().take(MAX_SOURCE_EXCERPT).collect();
            excerpt.push_str("...");
            excerpt
        } else {
            candidate.text.clone()
        };
        Self {
            id: candidate.id.clone(),
            score: candidate.score,
            text,
            metadata: candidate.metadata.clone(),
        }
    }

    /// Citation for a below-threshold source on the fallback path. Always
    /// carries an ellipsis to signal the excerpt is partial context.
    pub fn weak_from_candidate(candidate: &Candidate) -> Self {
        let mut text: String = candidate.text.chars().take(MAX_SOURCE_EXCERPT).collect();
        text.push_str("...");
        Self {
            id: candidate.id.clone(),
            score: candidate.score,
            text,
            metadata: candidate.metadata.clone(),
        }
    }
}

/// Complete answer envelope.
#[derive(Debug, Clone, Serialize)]
pub struct RagResult {
    pub session_id: String,
    pub query: String,
    pub response: String,
    pub response_label: ResponseLabel,
    pub confidence_level: ConfidenceLevel,
    /// Top retrieval score before reranking. Absent when nothing was
    /// retrieved or the request bypassed retrieval.
    pub top_score: Option<f32>,
    pub emergency: bool,
    pub fallback_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_details: Option<EmergencyDetection>,
    pub sources: Vec<SourceRef>,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

/// One chat turn for a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling parameters for one completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}
