//! Situation summarization and query-time bypass checks.
//!
//! The hard-rule shortlist catches phrasings the keyword detector misses,
//! like a bare "help" with nothing else. Summaries feed the emergency prompt
//! so the model can refer to what the user actually described.

use chrono::Utc;

use crate::detector::{self, EmergencyDetection, Severity};

/// Shortlist that forces the emergency path even when full detection found
/// nothing. First match wins.
pub const HARD_RULE_KEYWORDS: &[&str] = &[
    "accident",
    "help",
    "emergency",
    "bleeding",
    "can't breathe",
    "cant breathe",
    "injury",
    "hurt",
    "hospital now",
    "i don't know what to do",
    "i dont know what to do",
];

/// Decide whether a query must skip retrieval and go straight to the
/// emergency handler.
///
/// Full detection runs first; the hard rules are a safety net behind it.
/// Hard-rule hits carry the strongest action line even at urgent severity.
pub fn is_emergency_query(text: &str) -> Option<EmergencyDetection> {
    if let Some(detection) = detector::detect(text) {
        return Some(detection);
    }

    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }

    let matched = HARD_RULE_KEYWORDS.iter().find(|rule| lower.contains(**rule))?;
    log::debug!("hard-rule emergency match on {matched:?}");

    Some(EmergencyDetection {
        severity: Severity::Urgent,
        keywords: vec![(*matched).to_string()],
        critical_keywords: Vec::new(),
        recommended_action: "CALL 911/112/108 IMMEDIATELY".to_string(),
        timestamp: Utc::now(),
    })
}

/// One-line guess at what is happening, phrased for prompt interpolation.
pub fn summarize_situation(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return "unknown emergency situation".to_string();
    }

    if lower.contains("burn") {
        if lower.contains("gas") || lower.contains("fire") || lower.contains("flame") {
            return "possible burn injury, likely from gas or fire at home".to_string();
        }
        return "possible burn injury".to_string();
    }
    if lower.contains("accident") || lower.contains("crash") || lower.contains("hit by") {
        return "possible accident or trauma (e.g. car or home accident)".to_string();
    }
    if lower.contains("bleeding") || lower.contains("blood") {
        return "possible bleeding emergency".to_string();
    }
    if lower.contains("can't breathe")
        || lower.contains("cant breathe")
        || lower.contains("trouble breathing")
        || lower.contains("short of breath")
    {
        return "possible breathing difficulty".to_string();
    }
    if lower.contains("chest pain") {
        return "possible chest pain emergency".to_string();
    }
    if lower.contains("fall") || lower.contains("fell") {
        return "possible fall injury".to_string();
    }

    "possible medical emergency based on their message".to_string()
}
