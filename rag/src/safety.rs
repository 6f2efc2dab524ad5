//! Input sanitization and output safety checks.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::RagError;

/// Longest query accepted, in characters. Longer input is truncated.
pub const MAX_QUERY_LENGTH: usize = 5000;

/// Appended to generated guidance before it reaches the user.
pub const MEDICAL_DISCLAIMER: &str = "\n\n---\nThis guidance is AI-generated and not a \
substitute for professional medical advice. When in doubt, contact emergency services \
or a clinician.";

static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static DEFINITIVE_DIAGNOSIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)you (definitely|certainly) have").unwrap());

static PRESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)take \d+\s?(mg|milligrams?|tablets?|pills?)").unwrap()
});

static DISCOURAGE_CARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)no need to (see|call) (a )?(doctor|physician|911|112|108)").unwrap()
});

/// Normalize raw user input into a query the pipeline accepts.
///
/// Strips markup, collapses surrounding whitespace, and truncates to
/// [`MAX_QUERY_LENGTH`] characters. Input that is empty after cleaning is
/// rejected.
pub fn sanitize_query(raw: &str) -> Result<String, RagError> {
    let stripped = MARKUP_RE.replace_all(raw, "");
    let trimmed = stripped.trim();

    if trimmed.is_empty() {
        return Err(RagError::InvalidQuery("query is empty".to_string()));
    }

    if trimmed.chars().count() > MAX_QUERY_LENGTH {
        log::warn!("query truncated to {MAX_QUERY_LENGTH} characters");
        return Ok(trimmed.chars().take(MAX_QUERY_LENGTH).collect());
    }
    Ok(trimmed.to_string())
}

/// Scan generated text for phrasings the system must never emit. Returns the
/// labels of every rule the response violates.
pub fn check_response_safety(response: &str) -> Vec<&'static str> {
    let mut violations = Vec::new();
    if DEFINITIVE_DIAGNOSIS_RE.is_match(response) {
        violations.push("definitive_diagnosis");
    }
    if PRESCRIPTION_RE.is_match(response) {
        violations.push("dosage_instruction");
    }
    if DISCOURAGE_CARE_RE.is_match(response) {
        violations.push("discourages_care");
    }
    violations
}

/// Append the medical disclaimer unless the text already carries one.
pub fn append_disclaimer(response: &str) -> String {
    if response.contains("not a substitute for professional medical advice") {
        return response.to_string();
    }
    format!("{response}{MEDICAL_DISCLAIMER}")
}
