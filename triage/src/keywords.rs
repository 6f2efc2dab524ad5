//! Fixed keyword tables driving emergency detection.
//!
//! The main table is matched case-insensitively as substrings; the critical
//! subset escalates severity. Both tables are compile-time constants shared
//! read-only across concurrent detections.

/// Terms that mark a message as a potential emergency.
///
/// Entries are lowercase; multi-word entries like "bleeding heavily" match
/// regardless of surrounding text.
pub const EMERGENCY_KEYWORDS: &[&str] = &[
    "help",
    "emergency",
    "accident",
    "urgent",
    "unresponsive",
    "unconscious",
    "not breathing",
    "can't breathe",
    "cannot breathe",
    "difficulty breathing",
    "choking",
    "choke",
    "heart attack",
    "chest pain",
    "stroke",
    "seizure",
    "convulsion",
    "collapse",
    "collapsed",
    "bleeding heavily",
    "bleeding out",
    "severe bleeding",
    "profuse bleeding",
    "suicide",
    "suicidal",
    "kill myself",
    "overdose",
    "poisoning",
    "poisoned",
    "severe pain",
    "extreme pain",
    "unbearable pain",
    "losing consciousness",
    "passing out",
    "blacking out",
    "anaphylaxis",
    "allergic reaction",
    "severe allergic",
    "can't wake up",
    "won't wake up",
    "not responding",
    "amputation",
    "amputated",
    "severed",
    "impaled",
    "stab wound",
    "gunshot",
    "shot",
    "injury",
    "hurt",
    "hospital now",
    "i don't know what to do",
    "i dont know what to do",
    "burn victim",
    "severe burn",
    "electrocuted",
    "drowning",
    "drowned",
    "blue lips",
    "blue face",
    "no pulse",
    "cardiac arrest",
];

/// Subset of [`EMERGENCY_KEYWORDS`] that escalates severity to critical.
pub const CRITICAL_KEYWORDS: &[&str] = &[
    "not breathing",
    "can't breathe",
    "cannot breathe",
    "unresponsive",
    "unconscious",
    "no pulse",
    "cardiac arrest",
    "heart attack",
    "stroke",
    "seizure",
    "severe bleeding",
    "bleeding heavily",
];

/// Outcome of a keyword-table consistency check.
#[derive(Debug, Clone, Default)]
pub struct KeywordTableReport {
    /// Terms appearing more than once in the main table.
    pub duplicates: Vec<&'static str>,
    /// Critical terms absent from the main table.
    pub critical_missing: Vec<&'static str>,
}

impl KeywordTableReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.critical_missing.is_empty()
    }
}

/// Check the tables for duplicates and critical terms missing from the main
/// list. The tables are constants, so a dirty report means the source needs
/// fixing. Run by tests and the status command.
pub fn validate_keyword_tables() -> KeywordTableReport {
    let mut report = KeywordTableReport::default();

    let mut seen = std::collections::HashSet::new();
    for keyword in EMERGENCY_KEYWORDS {
        if !seen.insert(*keyword) {
            report.duplicates.push(keyword);
        }
    }

    for critical in CRITICAL_KEYWORDS {
        if !EMERGENCY_KEYWORDS.contains(critical) {
            report.critical_missing.push(critical);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_clean() {
        let report = validate_keyword_tables();
        assert!(
            report.is_clean(),
            "duplicates: {:?}, critical missing: {:?}",
            report.duplicates,
            report.critical_missing
        );
    }

    #[test]
    fn test_critical_is_proper_subset() {
        assert!(CRITICAL_KEYWORDS.len() < EMERGENCY_KEYWORDS.len());
        for critical in CRITICAL_KEYWORDS {
            assert!(
                EMERGENCY_KEYWORDS.contains(critical),
                "{critical} missing from main table"
            );
        }
    }

    #[test]
    fn test_entries_are_lowercase() {
        for keyword in EMERGENCY_KEYWORDS {
            assert_eq!(*keyword, keyword.to_lowercase());
        }
    }

    #[test]
    fn test_report_flags_missing_critical() {
        // Synthetic check of the report plumbing itself.
        let mut report = KeywordTableReport::default();
        assert!(report.is_clean());
        report.critical_missing.push("made up term");
        assert!(!report.is_clean());
    }
}
