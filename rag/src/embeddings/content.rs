//! Content builders for generating text representations of documents.
//!
//! These text representations are what gets embedded for vector search and
//! what the prompt assembler quotes as context. Knowledge-base entries come
//! in several shapes (plain text, Q&A pairs, clinical notes with context and
//! explanation), so the builder probes fields in priority order.

use std::collections::HashMap;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::types::DocumentRecord;

/// Build embeddable text from document metadata.
///
/// A `text` field wins outright. Otherwise the builder assembles
/// question/answer/context/explanation fields, and an entry with none of
/// them yields the placeholder "No content available".
pub fn build_document_content(metadata: &HashMap<String, Value>) -> String {
    if let Some(text) = string_field(metadata, "text") {
        return text.to_string();
    }

    let mut parts: Vec<String> = Vec::new();

    if let Some(question) = string_field(metadata, "question") {
        parts.push(format!("Question: {question}"));
    }

    let answer =
        string_field(metadata, "answer").or_else(|| string_field(metadata, "response"));
    if let Some(answer) = answer {
        parts.push(format!("Answer: {answer}"));
    } else if let Some(context) = string_field(metadata, "context") {
        parts.push(context.to_string());
    }

    if let Some(explanation) = string_field(metadata, "explanation") {
        parts.push(format!("Explanation: {explanation}"));
    }

    let text = parts.join("\n\n").trim().to_string();
    if text.is_empty() {
        "No content available".to_string()
    } else {
        text
    }
}

/// Compute a SHA-256 content hash, used as a stable document id so
/// re-ingesting the same entry overwrites instead of duplicating.
pub fn compute_content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Build an indexable record from raw metadata.
pub fn document_to_record(metadata: HashMap<String, Value>) -> DocumentRecord {
    let text = build_document_content(&metadata);
    DocumentRecord {
        id: compute_content_hash(&text),
        text,
        metadata,
    }
}

fn string_field<'a>(metadata: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    metadata
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(pairs: &[(&str, &str)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[test]
    fn test_text_field_wins() {
        let meta = metadata(&[
            ("text", "Apply firm pressure to the wound."),
            ("question", "ignored"),
        ]);
        assert_eq!(
            build_document_content(&meta),
            "Apply firm pressure to the wound."
        );
    }

    #[test]
    fn test_question_answer_pair() {
        let meta = metadata(&[
            ("question", "How do I treat a minor burn?"),
            ("answer", "Cool it under running water for 20 minutes."),
        ]);
        assert_eq!(
            build_document_content(&meta),
            "Question: How do I treat a minor burn?\n\nAnswer: Cool it under running water for 20 minutes."
        );
    }

    #[test]
    fn test_response_substitutes_for_answer() {
        let meta = metadata(&[("response", "Elevate the limb.")]);
        assert_eq!(build_document_content(&meta), "Answer: Elevate the limb.");
    }

    #[test]
    fn test_context_used_only_without_answer() {
        let with_answer = metadata(&[("answer", "Yes."), ("context", "never shown")]);
        assert!(!build_document_content(&with_answer).contains("never shown"));

        let without = metadata(&[("context", "Patient presented with wheezing.")]);
        assert_eq!(
            build_document_content(&without),
            "Patient presented with wheezing."
        );
    }

    #[test]
    fn test_explanation_appended() {
        let meta = metadata(&[
            ("answer", "Use an epinephrine auto-injector."),
            ("explanation", "Anaphylaxis progresses quickly."),
        ]);
        assert_eq!(
            build_document_content(&meta),
            "Answer: Use an epinephrine auto-injector.\n\nExplanation: Anaphylaxis progresses quickly."
        );
    }

    #[test]
    fn test_empty_metadata_placeholder() {
        assert_eq!(
            build_document_content(&HashMap::new()),
            "No content available"
        );
        let blank = metadata(&[("question", "   ")]);
        assert_eq!(build_document_content(&blank), "No content available");
    }

    #[test]
    fn test_non_string_fields_ignored() {
        let mut meta = HashMap::new();
        meta.insert("question".to_string(), json!(42));
        meta.insert("answer".to_string(), json!("Rest and hydrate."));
        assert_eq!(build_document_content(&meta), "Answer: Rest and hydrate.");
    }

    #[test]
    fn test_content_hash_deterministic() {
        let hash1 = compute_content_hash("test content");
        let hash2 = compute_content_hash("test content");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_content_hash_different() {
        assert_ne!(
            compute_content_hash("content a"),
            compute_content_hash("content b")
        );
    }

    #[test]
    fn test_record_id_stable_across_reingest() {
        let first = document_to_record(metadata(&[("text", "CPR basics")]));
        let second = document_to_record(metadata(&[("text", "CPR basics")]));
        assert_eq!(first.id, second.id);
        assert_eq!(first.text, "CPR basics");
    }
}
