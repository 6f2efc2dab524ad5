//! Keyword-based emergency detection.
//!
//! Scans free text against the fixed tables in [`crate::keywords`] and
//! produces a severity verdict. Detection is substring-based and
//! case-insensitive; an empty match set yields `None` rather than an empty
//! verdict so callers can branch on presence alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keywords::{CRITICAL_KEYWORDS, EMERGENCY_KEYWORDS};

/// How urgently a detected emergency needs intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Urgent,
}

/// A positive emergency verdict.
///
/// Only produced when at least one keyword matched, so `keywords` is never
/// empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyDetection {
    pub severity: Severity,
    /// Main-table terms found in the text, in table order.
    pub keywords: Vec<String>,
    /// Critical-table terms found in the text, in table order.
    pub critical_keywords: Vec<String>,
    pub recommended_action: String,
    pub timestamp: DateTime<Utc>,
}

impl EmergencyDetection {
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// Action line for a severity tier.
pub fn recommended_action(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "CALL 911/112/108 IMMEDIATELY",
        Severity::Urgent => "Seek immediate medical attention",
    }
}

/// All main-table keywords present in `text`, lowercased scan, table order.
pub fn matched_keywords(text: &str) -> Vec<String> {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return Vec::new();
    }
    EMERGENCY_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(**keyword))
        .map(|keyword| (*keyword).to_string())
        .collect()
}

/// Scan `text` for emergency keywords.
///
/// Returns `None` when nothing matched. A hit on any critical-table term
/// escalates the verdict to [`Severity::Critical`].
pub fn detect(text: &str) -> Option<EmergencyDetection> {
    let keywords = matched_keywords(text);
    if keywords.is_empty() {
        return None;
    }

    let lower = text.trim().to_lowercase();
    let critical_keywords: Vec<String> = CRITICAL_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(**keyword))
        .map(|keyword| (*keyword).to_string())
        .collect();

    let severity = if critical_keywords.is_empty() {
        Severity::Urgent
    } else {
        Severity::Critical
    };

    log::debug!(
        "emergency detected severity={severity:?} keywords={} critical={}",
        keywords.len(),
        critical_keywords.len()
    );

    Some(EmergencyDetection {
        severity,
        keywords,
        critical_keywords,
        recommended_action: recommended_action(severity).to_string(),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keywords_yields_none() {
        assert!(detect("what is the recommended dose of vitamin d").is_none());
        assert!(detect("").is_none());
        assert!(detect("   ").is_none());
    }

    #[test]
    fn test_urgent_without_critical_terms() {
        let detection = detect("I had an accident and my arm is hurt").unwrap();
        assert_eq!(detection.severity, Severity::Urgent);
        assert!(detection.keywords.contains(&"accident".to_string()));
        assert!(detection.keywords.contains(&"hurt".to_string()));
        assert!(detection.critical_keywords.is_empty());
        assert_eq!(detection.recommended_action, "Seek immediate medical attention");
    }

    #[test]
    fn test_critical_term_escalates() {
        let detection = detect("My father is not breathing, please help").unwrap();
        assert_eq!(detection.severity, Severity::Critical);
        assert!(detection
            .critical_keywords
            .contains(&"not breathing".to_string()));
        assert_eq!(detection.recommended_action, "CALL 911/112/108 IMMEDIATELY");
    }

    #[test]
    fn test_case_insensitive_match() {
        let detection = detect("HEART ATTACK symptoms right now").unwrap();
        assert_eq!(detection.severity, Severity::Critical);
        assert!(detection.keywords.contains(&"heart attack".to_string()));
    }

    #[test]
    fn test_keywords_never_empty_on_some() {
        let detection = detect("severe pain in my leg").unwrap();
        assert!(!detection.keywords.is_empty());
    }

    #[test]
    fn test_multiword_substring_matches_inside_sentence() {
        let detection = detect("she keeps passing out every few minutes").unwrap();
        assert_eq!(detection.severity, Severity::Urgent);
        assert_eq!(detection.keywords, vec!["passing out".to_string()]);
    }

    #[test]
    fn test_matched_keywords_follow_table_order() {
        let keywords = matched_keywords("unconscious after the accident, send help");
        assert_eq!(
            keywords,
            vec![
                "help".to_string(),
                "accident".to_string(),
                "unconscious".to_string()
            ]
        );
    }

    #[test]
    fn test_severity_wire_format() {
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"critical\""
        );
        assert_eq!(
            serde_json::to_string(&Severity::Urgent).unwrap(),
            "\"urgent\""
        );
    }
}
