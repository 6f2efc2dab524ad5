//! The answer pipeline.
//!
//! One request flows embed -> retrieve -> widen -> classify -> rerank ->
//! prompt -> complete. Retrieval that comes back empty or too weak is
//! retried once at a wider depth, and if it stays unusable the pipeline
//! answers from the model alone, clearly labelled. Scores at or above the
//! fallback threshold always take the grounded path, however thin.
//!
//! Provider failures propagate to the caller; the single exception is the
//! emergency bypass, which must produce guidance even when the completion
//! backend is down.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use firstline_triage::{summarize_situation, EmergencyDetection};

use crate::completion::{CompletionProvider, TokenStream};
use crate::config::RagConfig;
use crate::embeddings::{document_to_record, EmbeddingProvider};
use crate::error::RagError;
use crate::index::VectorIndex;
use crate::prompt::{
    build_context, build_emergency_user_prompt, build_fallback_system_prompt,
    build_fallback_user_prompt, build_system_prompt, build_user_prompt,
    emergency_system_prompt,
};
use crate::rerank::rerank_candidates;
use crate::safety::{append_disclaimer, check_response_safety, sanitize_query};
use crate::types::{
    Candidate, ChatMessage, CompletionOptions, ConfidenceLevel, DocumentRecord, FallbackReason,
    RagRequest, RagResult, ResponseLabel, SourceRef,
};

/// Weak candidates carried onto a fallback answer, at most.
const MAX_WEAK_SOURCES: usize = 2;

/// Shown alongside every model-only answer.
const FALLBACK_WARNING: &str = "\u{26a0}\u{fe0f} Model-based response — not source-backed. \
Retrieved sources had low relevance. Please consult a healthcare professional for \
definitive guidance.";

/// Last-resort emergency guidance when the completion backend fails.
const EMERGENCY_DEFAULT_RESPONSE: &str = "Please contact emergency services immediately.";

/// A completion call ready to run, plus the result envelope it will fill.
struct PreparedCall {
    messages: Vec<ChatMessage>,
    options: CompletionOptions,
    skeleton: RagResult,
}

/// Orchestrates retrieval, grounding decisions and answer generation.
pub struct RagPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    completion: Arc<dyn CompletionProvider>,
    config: RagConfig,
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        completion: Arc<dyn CompletionProvider>,
        config: RagConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            completion,
            config,
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Answer `request` and return the full result.
    pub async fn handle_query(&self, request: &RagRequest) -> Result<RagResult, RagError> {
        let prepared = self.prepare(request).await?;
        let response = self
            .completion
            .complete(&prepared.messages, prepared.options)
            .await?;

        let violations = check_response_safety(&response);
        if !violations.is_empty() {
            log::warn!(
                "response safety violations for session {}: {violations:?}",
                request.session_id
            );
        }

        let mut result = prepared.skeleton;
        result.response = append_disclaimer(&response);
        result.timestamp = Utc::now();
        log_rag_event(&result);
        Ok(result)
    }

    /// Answer `request`, streaming tokens as they arrive.
    ///
    /// Retrieval, widening and fallback decisions are identical to
    /// [`RagPipeline::handle_query`]. The returned envelope carries the
    /// grounding metadata with an empty `response`; dropping the stream
    /// cancels generation.
    pub async fn handle_query_stream(
        &self,
        request: &RagRequest,
    ) -> Result<(RagResult, TokenStream), RagError> {
        let prepared = self.prepare(request).await?;
        let stream = self
            .completion
            .complete_stream(&prepared.messages, prepared.options)
            .await?;
        log_rag_event(&prepared.skeleton);
        Ok((prepared.skeleton, stream))
    }

    /// Emergency bypass: no retrieval, tight sampling, and a canned answer
    /// if the provider fails. This path never returns a provider error.
    pub async fn handle_emergency_query(
        &self,
        request: &RagRequest,
        detection: &EmergencyDetection,
    ) -> Result<RagResult, RagError> {
        let query = sanitize_query(&request.query)?;
        let situation = summarize_situation(&query);

        log::info!(
            "emergency bypass for session {} severity={:?}",
            request.session_id,
            detection.severity
        );

        let messages = vec![
            ChatMessage::system(emergency_system_prompt()),
            ChatMessage::user(build_emergency_user_prompt(&query, &situation)),
        ];
        let options = CompletionOptions {
            temperature: 0.05,
            max_tokens: 400,
        };

        let response = match self.completion.complete(&messages, options).await {
            Ok(text) => text,
            Err(err) => {
                log::error!("emergency completion failed, using canned guidance: {err}");
                EMERGENCY_DEFAULT_RESPONSE.to_string()
            }
        };

        let result = RagResult {
            session_id: request.session_id.clone(),
            query: request.query.clone(),
            response,
            response_label: ResponseLabel::EmergencyBypass,
            confidence_level: ConfidenceLevel::Emergency,
            top_score: None,
            emergency: true,
            fallback_used: false,
            fallback_reason: None,
            warning: None,
            emergency_details: Some(detection.clone()),
            sources: Vec::new(),
            model: self.completion.model_name().to_string(),
            timestamp: Utc::now(),
        };
        log_rag_event(&result);
        Ok(result)
    }

    /// Embed and index a batch of knowledge-base entries. Returns how many
    /// the index accepted.
    pub async fn ingest(
        &self,
        entries: Vec<HashMap<String, Value>>,
    ) -> Result<usize, RagError> {
        if entries.is_empty() {
            return Ok(0);
        }

        let records: Vec<DocumentRecord> =
            entries.into_iter().map(document_to_record).collect();
        let texts: Vec<String> = records.iter().map(|record| record.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        if vectors.len() != records.len() {
            return Err(RagError::Embedding(format!(
                "expected {} embeddings, got {}",
                records.len(),
                vectors.len()
            )));
        }

        let pairs: Vec<(DocumentRecord, Vec<f32>)> =
            records.into_iter().zip(vectors).collect();
        let accepted = self.index.upsert(&pairs).await?;
        log::info!("ingested {accepted} documents");
        Ok(accepted)
    }

    /// Run retrieval and build the completion call for `request`.
    async fn prepare(&self, request: &RagRequest) -> Result<PreparedCall, RagError> {
        let query = sanitize_query(&request.query)?;
        let emergency = request.emergency.is_some();
        let top_k = request.top_k.unwrap_or(self.config.top_k);
        let retrieval_top_k = if self.config.rerank_enabled {
            top_k * 2
        } else {
            top_k
        };

        let vector = self.embedder.embed(&query).await?;
        let mut candidates = self.index.query(&vector, retrieval_top_k).await?;

        // One widening retry per condition, never recursive.
        if candidates.is_empty() {
            let widened = retrieval_top_k * 3;
            log::info!("no matches at k={retrieval_top_k}, retrying at k={widened}");
            candidates = self.index.query(&vector, widened).await?;
        } else if candidates[0].score < self.config.threshold_fallback {
            let widened = retrieval_top_k * 2;
            log::info!(
                "top score {:.3} below fallback threshold, retrying at k={widened}",
                candidates[0].score
            );
            candidates = self.index.query(&vector, widened).await?;
        }

        if candidates.is_empty() {
            return Ok(self.prepare_fallback(request, &query, Vec::new(), FallbackReason::NoRetrieval));
        }

        let top_score = candidates[0].score;
        if top_score < self.config.threshold_fallback {
            let weak: Vec<Candidate> =
                candidates.into_iter().take(MAX_WEAK_SOURCES).collect();
            return Ok(self.prepare_fallback(
                request,
                &query,
                weak,
                FallbackReason::LowConfidence,
            ));
        }

        let (confidence_level, response_label, mut temperature) =
            if top_score >= self.config.threshold_high {
                (ConfidenceLevel::High, ResponseLabel::Grounded, 0.2)
            } else if top_score >= self.config.threshold_partial {
                (
                    ConfidenceLevel::Partial,
                    ResponseLabel::PartiallyGrounded,
                    0.4,
                )
            } else {
                (ConfidenceLevel::Low, ResponseLabel::LowGrounded, 0.4)
            };
        if emergency {
            temperature = 0.1;
        }
        let max_tokens = if emergency { 1500 } else { 1000 };

        let mut context_candidates = if self.config.rerank_enabled {
            rerank_candidates(
                self.completion.as_ref(),
                &query,
                candidates,
                self.config.rerank_strategy,
                top_k,
            )
            .await
        } else {
            candidates
        };
        context_candidates.truncate(self.config.rerank_top_k);

        let context = build_context(&context_candidates);
        let messages = vec![
            ChatMessage::system(build_system_prompt(confidence_level, emergency)),
            ChatMessage::user(build_user_prompt(
                &query,
                &context,
                confidence_level,
                emergency,
            )),
        ];

        Ok(PreparedCall {
            messages,
            options: CompletionOptions {
                temperature,
                max_tokens,
            },
            skeleton: RagResult {
                session_id: request.session_id.clone(),
                query: request.query.clone(),
                response: String::new(),
                response_label,
                confidence_level,
                top_score: Some(top_score),
                emergency,
                fallback_used: false,
                fallback_reason: None,
                warning: None,
                emergency_details: None,
                sources: context_candidates
                    .iter()
                    .map(SourceRef::from_candidate)
                    .collect(),
                model: self.completion.model_name().to_string(),
                timestamp: Utc::now(),
            },
        })
    }

    fn prepare_fallback(
        &self,
        request: &RagRequest,
        query: &str,
        weak: Vec<Candidate>,
        reason: FallbackReason,
    ) -> PreparedCall {
        let emergency = request.emergency.is_some();
        let temperature = if emergency { 0.1 } else { 0.4 };
        let max_tokens = if emergency { 1500 } else { 1000 };

        log::info!(
            "fallback answer for session {} reason={reason:?} weak_sources={}",
            request.session_id,
            weak.len()
        );

        let messages = vec![
            ChatMessage::system(build_fallback_system_prompt(emergency)),
            ChatMessage::user(build_fallback_user_prompt(query, &weak)),
        ];

        PreparedCall {
            messages,
            options: CompletionOptions {
                temperature,
                max_tokens,
            },
            skeleton: RagResult {
                session_id: request.session_id.clone(),
                query: request.query.clone(),
                response: String::new(),
                response_label: ResponseLabel::ModelFallback,
                confidence_level: ConfidenceLevel::Fallback,
                top_score: weak.first().map(|candidate| candidate.score),
                emergency,
                fallback_used: true,
                fallback_reason: Some(reason),
                warning: Some(FALLBACK_WARNING.to_string()),
                emergency_details: None,
                sources: weak.iter().map(SourceRef::weak_from_candidate).collect(),
                model: self.completion.model_name().to_string(),
                timestamp: Utc::now(),
            },
        }
    }
}

/// One structured line per answered request, for analytics scraping.
fn log_rag_event(result: &RagResult) {
    log::info!(
        target: "rag_event",
        "session={} label={:?} confidence={:?} top_score={:?} sources={} emergency={} fallback_reason={:?}",
        result.session_id,
        result.response_label,
        result.confidence_level,
        result.top_score,
        result.sources.len(),
        result.emergency,
        result.fallback_reason
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::index::IndexStats;

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, RagError> {
            Ok(vec![0.1, 0.2, 0.3])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
            Ok(texts.iter().map(|_| vec![0.1, 0.2, 0.3]).collect())
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn model_name(&self) -> &str {
            "fixed-embedder"
        }
    }

    struct ScriptedIndex {
        responses: Mutex<VecDeque<Vec<Candidate>>>,
        calls: Mutex<Vec<usize>>,
    }

    impl ScriptedIndex {
        fn new(responses: Vec<Vec<Candidate>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn recorded_top_ks(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VectorIndex for ScriptedIndex {
        async fn query(
            &self,
            _vector: &[f32],
            top_k: usize,
        ) -> Result<Vec<Candidate>, RagError> {
            self.calls.lock().unwrap().push(top_k);
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("index script exhausted"))
        }

        async fn upsert(
            &self,
            records: &[(DocumentRecord, Vec<f32>)],
        ) -> Result<usize, RagError> {
            Ok(records.len())
        }

        async fn stats(&self) -> Result<IndexStats, RagError> {
            Ok(IndexStats {
                total_vectors: 0,
                dimension: 3,
            })
        }
    }

    struct RecordingCompletion {
        responses: Mutex<VecDeque<Result<String, String>>>,
        calls: Mutex<Vec<(Vec<ChatMessage>, CompletionOptions)>>,
    }

    impl RecordingCompletion {
        fn new(responses: Vec<Result<&str, &str>>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn last_call(&self) -> (Vec<ChatMessage>, CompletionOptions) {
            self.calls.lock().unwrap().last().cloned().expect("no calls")
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionProvider for RecordingCompletion {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            options: CompletionOptions,
        ) -> Result<String, RagError> {
            self.calls
                .lock()
                .unwrap()
                .push((messages.to_vec(), options));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("completion script exhausted")
                .map_err(RagError::Completion)
        }

        async fn complete_stream(
            &self,
            _messages: &[ChatMessage],
            _options: CompletionOptions,
        ) -> Result<TokenStream, RagError> {
            unimplemented!("not used in pipeline tests")
        }

        async fn list_models(&self) -> Result<Vec<String>, RagError> {
            Ok(vec!["scripted-model".to_string()])
        }

        fn model_name(&self) -> &str {
            "scripted-model"
        }
    }

    fn candidate(id: &str, score: f32) -> Candidate {
        Candidate {
            id: id.to_string(),
            score,
            text: format!("guidance text {id}"),
            metadata: HashMap::new(),
        }
    }

    fn pipeline(
        index: ScriptedIndex,
        completion: RecordingCompletion,
        config: RagConfig,
    ) -> (RagPipeline, Arc<ScriptedIndex>, Arc<RecordingCompletion>) {
        let index = Arc::new(index);
        let completion = Arc::new(completion);
        let pipeline = RagPipeline::new(
            Arc::new(FixedEmbedder),
            index.clone(),
            completion.clone(),
            config,
        );
        (pipeline, index, completion)
    }

    #[tokio::test]
    async fn test_high_confidence_grounded_answer() {
        let (pipeline, index, completion) = pipeline(
            ScriptedIndex::new(vec![vec![
                candidate("a", 0.9),
                candidate("b", 0.85),
                candidate("c", 0.7),
                candidate("d", 0.65),
            ]]),
            RecordingCompletion::new(vec![Ok("Apply direct pressure to the wound.")]),
            RagConfig::default(),
        );

        let request = RagRequest::new("s1", "how do I stop heavy bleeding from a cut");
        let result = pipeline.handle_query(&request).await.unwrap();

        assert_eq!(result.response_label, ResponseLabel::Grounded);
        assert_eq!(result.confidence_level, ConfidenceLevel::High);
        assert_eq!(result.top_score, Some(0.9));
        assert!(!result.fallback_used);
        assert!(result.warning.is_none());
        // Context is sliced to rerank_top_k even without reranking.
        assert_eq!(result.sources.len(), 3);
        assert_eq!(result.sources[0].id, "a");
        assert!(result.response.starts_with("Apply direct pressure"));
        assert!(result.response.contains("not a substitute"));
        assert_eq!(result.model, "scripted-model");

        assert_eq!(index.recorded_top_ks(), vec![5]);
        let (messages, options) = completion.last_call();
        assert_eq!(options.temperature, 0.2);
        assert_eq!(options.max_tokens, 1000);
        assert!(messages[0].content.contains("highly relevant"));
    }

    #[tokio::test]
    async fn test_partial_band_uses_blended_guidance() {
        let (pipeline, _, completion) = pipeline(
            ScriptedIndex::new(vec![vec![candidate("a", 0.75)]]),
            RecordingCompletion::new(vec![Ok("Likely a mild sprain.")]),
            RagConfig::default(),
        );

        let result = pipeline
            .handle_query(&RagRequest::new("s1", "ankle rolled during a run"))
            .await
            .unwrap();

        assert_eq!(result.response_label, ResponseLabel::PartiallyGrounded);
        assert_eq!(result.confidence_level, ConfidenceLevel::Partial);
        let (messages, options) = completion.last_call();
        assert_eq!(options.temperature, 0.4);
        assert!(messages[0].content.contains("may not be perfectly matched"));
    }

    #[tokio::test]
    async fn test_low_band_stays_on_grounded_path() {
        let (pipeline, _, _) = pipeline(
            ScriptedIndex::new(vec![vec![candidate("a", 0.65)]]),
            RecordingCompletion::new(vec![Ok("Possible tension headache.")]),
            RagConfig::default(),
        );

        let result = pipeline
            .handle_query(&RagRequest::new("s1", "dull headache since this morning"))
            .await
            .unwrap();

        assert_eq!(result.response_label, ResponseLabel::LowGrounded);
        assert_eq!(result.confidence_level, ConfidenceLevel::Low);
        assert!(!result.fallback_used);
        assert!(result.fallback_reason.is_none());
        assert_eq!(result.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_matches_widen_then_model_fallback() {
        let (pipeline, index, completion) = pipeline(
            ScriptedIndex::new(vec![vec![], vec![]]),
            RecordingCompletion::new(vec![Ok("**Model-based — not source-backed** ...")]),
            RagConfig::default(),
        );

        let result = pipeline
            .handle_query(&RagRequest::new("s1", "rare tropical parasite symptoms"))
            .await
            .unwrap();

        assert_eq!(index.recorded_top_ks(), vec![5, 15]);
        assert_eq!(result.response_label, ResponseLabel::ModelFallback);
        assert_eq!(result.confidence_level, ConfidenceLevel::Fallback);
        assert_eq!(result.fallback_reason, Some(FallbackReason::NoRetrieval));
        assert_eq!(result.top_score, None);
        assert!(result.fallback_used);
        assert!(result.sources.is_empty());
        assert!(result.warning.as_deref().unwrap().contains("not source-backed"));

        let (messages, _) = completion.last_call();
        assert!(messages[1].content.contains("No sources were retrieved"));
    }

    #[tokio::test]
    async fn test_weak_scores_widen_once_then_fallback_with_weak_sources() {
        let (pipeline, index, _) = pipeline(
            ScriptedIndex::new(vec![
                vec![candidate("a", 0.5), candidate("b", 0.4)],
                vec![candidate("c", 0.55), candidate("d", 0.5), candidate("e", 0.4)],
            ]),
            RecordingCompletion::new(vec![Ok("Model answer.")]),
            RagConfig::default(),
        );

        let result = pipeline
            .handle_query(&RagRequest::new("s1", "odd intermittent symptom"))
            .await
            .unwrap();

        assert_eq!(index.recorded_top_ks(), vec![5, 10]);
        assert_eq!(result.fallback_reason, Some(FallbackReason::LowConfidence));
        assert_eq!(result.top_score, Some(0.55));
        assert_eq!(result.sources.len(), 2);
        assert!(result.sources.iter().all(|source| source.text.ends_with("...")));
    }

    #[tokio::test]
    async fn test_rerank_doubles_retrieval_and_reorders_context() {
        let config = RagConfig {
            rerank_enabled: true,
            ..RagConfig::default()
        };
        let (pipeline, index, completion) = pipeline(
            ScriptedIndex::new(vec![vec![
                candidate("a", 0.9),
                candidate("b", 0.85),
                candidate("c", 0.8),
            ]]),
            RecordingCompletion::new(vec![
                Ok("3"),
                Ok("9"),
                Ok("5"),
                Ok("Final answer."),
            ]),
            config,
        );

        let mut request = RagRequest::new("s1", "how to treat a burn");
        request.top_k = Some(2);
        let result = pipeline.handle_query(&request).await.unwrap();

        assert_eq!(index.recorded_top_ks(), vec![4]);
        assert_eq!(completion.call_count(), 4);
        // b outranked a after rerank; context keeps request top_k entries.
        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.sources[0].id, "b");
        assert_eq!(result.sources[1].id, "c");
        // Grounding still reports the pre-rerank top score.
        assert_eq!(result.top_score, Some(0.9));

        let (_, options) = completion.last_call();
        assert_eq!(options.max_tokens, 1000);
    }

    #[tokio::test]
    async fn test_emergency_flag_tightens_sampling() {
        let detection = firstline_triage::detect("severe chest pain").unwrap();
        let (pipeline, _, completion) = pipeline(
            ScriptedIndex::new(vec![vec![candidate("a", 0.9)]]),
            RecordingCompletion::new(vec![Ok("Call for help now.")]),
            RagConfig::default(),
        );

        let mut request = RagRequest::new("s1", "severe chest pain what do I do");
        request.emergency = Some(detection);
        let result = pipeline.handle_query(&request).await.unwrap();

        assert!(result.emergency);
        let (messages, options) = completion.last_call();
        assert_eq!(options.temperature, 0.1);
        assert_eq!(options.max_tokens, 1500);
        assert!(messages[0].content.contains("EMERGENCY MODE ACTIVE"));
        assert!(messages[1].content.contains("THIS IS AN EMERGENCY"));
    }

    #[tokio::test]
    async fn test_emergency_bypass_masks_provider_failure() {
        let detection = firstline_triage::detect("he is not breathing").unwrap();
        let (pipeline, _, _) = pipeline(
            ScriptedIndex::new(vec![]),
            RecordingCompletion::new(vec![Err("backend down")]),
            RagConfig::default(),
        );

        let request = RagRequest::new("s1", "he is not breathing help");
        let result = pipeline
            .handle_emergency_query(&request, &detection)
            .await
            .unwrap();

        assert_eq!(result.response, EMERGENCY_DEFAULT_RESPONSE);
        assert_eq!(result.response_label, ResponseLabel::EmergencyBypass);
        assert_eq!(result.confidence_level, ConfidenceLevel::Emergency);
        assert_eq!(result.top_score, None);
        assert!(result.emergency);
        assert!(result.sources.is_empty());
        assert!(result.emergency_details.is_some());
    }

    #[tokio::test]
    async fn test_emergency_bypass_describes_situation() {
        let detection = firstline_triage::detect("severe burn from the stove fire").unwrap();
        let (pipeline, _, completion) = pipeline(
            ScriptedIndex::new(vec![]),
            RecordingCompletion::new(vec![Ok("Call 911 now. Cool the burn with water.")]),
            RagConfig::default(),
        );

        let request = RagRequest::new("s1", "severe burn from the stove fire");
        let result = pipeline
            .handle_emergency_query(&request, &detection)
            .await
            .unwrap();

        assert!(result.response.starts_with("Call 911"));
        let (messages, options) = completion.last_call();
        assert_eq!(options.temperature, 0.05);
        assert_eq!(options.max_tokens, 400);
        assert!(messages[1]
            .content
            .contains("possible burn injury, likely from gas or fire at home"));
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_retrieval() {
        let (pipeline, index, _) = pipeline(
            ScriptedIndex::new(vec![]),
            RecordingCompletion::new(vec![]),
            RagConfig::default(),
        );

        let request = RagRequest::new("s1", "   ");
        let err = pipeline.handle_query(&request).await.unwrap_err();
        assert!(matches!(err, RagError::InvalidQuery(_)));
        assert!(index.recorded_top_ks().is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_propagates_on_normal_path() {
        let (pipeline, _, _) = pipeline(
            ScriptedIndex::new(vec![vec![candidate("a", 0.9)]]),
            RecordingCompletion::new(vec![Err("overloaded")]),
            RagConfig::default(),
        );

        let err = pipeline
            .handle_query(&RagRequest::new("s1", "how to dress a wound"))
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Completion(_)));
    }

    #[tokio::test]
    async fn test_ingest_embeds_and_upserts() {
        let (pipeline, _, _) = pipeline(
            ScriptedIndex::new(vec![]),
            RecordingCompletion::new(vec![]),
            RagConfig::default(),
        );

        let mut entry = HashMap::new();
        entry.insert("text".to_string(), serde_json::json!("CPR basics"));
        let accepted = pipeline.ingest(vec![entry]).await.unwrap();
        assert_eq!(accepted, 1);

        assert_eq!(pipeline.ingest(Vec::new()).await.unwrap(), 0);
    }
}
