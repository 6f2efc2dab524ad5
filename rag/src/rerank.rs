//! Candidate reranking.
//!
//! The LLM strategy asks the completion model to score each candidate's
//! relevance on a 0-10 scale, all candidates in parallel. A candidate whose
//! scoring call fails or returns garbage falls back to its original
//! similarity scaled onto the rerank scale, so reranking can only reorder,
//! never drop. The embedding strategy trusts the index ordering as-is.

use std::cmp::Ordering;
use std::sync::LazyLock;

use futures::future::join_all;
use regex::Regex;

use crate::completion::CompletionProvider;
use crate::config::RerankStrategy;
use crate::types::{Candidate, ChatMessage, CompletionOptions};

/// Longest candidate excerpt shown to the scoring model.
pub const RERANK_SNIPPET_LIMIT: usize = 500;

/// Original similarity [0, 1] maps to the lower half of the 0-10 scale when
/// used as a failure fallback.
const FALLBACK_SCALE: f32 = 5.0;

static LEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(\.\d+)?").unwrap());

/// Reorder `candidates` and keep the best `top_k`.
pub async fn rerank_candidates(
    provider: &dyn CompletionProvider,
    query: &str,
    candidates: Vec<Candidate>,
    strategy: RerankStrategy,
    top_k: usize,
) -> Vec<Candidate> {
    match strategy {
        RerankStrategy::Llm => rerank_with_llm(provider, query, candidates, top_k).await,
        RerankStrategy::Embedding => candidates.into_iter().take(top_k).collect(),
    }
}

async fn rerank_with_llm(
    provider: &dyn CompletionProvider,
    query: &str,
    candidates: Vec<Candidate>,
    top_k: usize,
) -> Vec<Candidate> {
    let scoring = candidates.iter().map(|candidate| async move {
        let snippet: String = candidate.text.chars().take(RERANK_SNIPPET_LIMIT).collect();
        let prompt = format!(
            "Rate the relevance of this medical text to the query.\n\n\
             Query: {query}\n\nText: {snippet}\n\n\
             Respond with ONLY a number from 0-10. No explanation."
        );
        let messages = vec![ChatMessage::user(prompt)];
        let options = CompletionOptions {
            temperature: 0.1,
            max_tokens: 10,
        };

        match provider.complete(&messages, options).await {
            Ok(response) => parse_rerank_score(&response),
            Err(err) => {
                log::warn!("rerank scoring failed for {}: {err}", candidate.id);
                None
            }
        }
    });

    let scores = join_all(scoring).await;

    let mut ranked: Vec<(usize, f32, Candidate)> = candidates
        .into_iter()
        .zip(scores)
        .enumerate()
        .map(|(position, (candidate, score))| {
            let rerank_score = score.unwrap_or(candidate.score * FALLBACK_SCALE);
            (position, rerank_score, candidate)
        })
        .collect();

    // Best rerank score first; original index order breaks ties so equal
    // scores keep the index ranking.
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    ranked
        .into_iter()
        .take(top_k)
        .map(|(_, _, candidate)| candidate)
        .collect()
}

/// Pull the first numeric token out of a scoring response.
fn parse_rerank_score(response: &str) -> Option<f32> {
    LEADING_NUMBER_RE
        .find(response)
        .and_then(|hit| hit.as_str().parse().ok())
}
