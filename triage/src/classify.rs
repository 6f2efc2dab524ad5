//! Ordered emergency-type classification.
//!
//! A fixed table of (pattern, category) rows is evaluated top to bottom and
//! the first hit wins, so a message mentioning both chest pain and bleeding
//! is classified cardiac. Messages matching no row but containing an
//! emergency keyword fall back to [`EmergencyType::General`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::detector::matched_keywords;

/// Category of emergency, most life-threatening categories first in the
/// classification order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyType {
    Cardiac,
    Breathing,
    Bleeding,
    Unconscious,
    Choking,
    Seizure,
    Trauma,
    /// Emergency keywords present but no specific category matched.
    General,
    None,
}

impl EmergencyType {
    /// True for everything except [`EmergencyType::None`].
    pub fn is_emergency(self) -> bool {
        self != EmergencyType::None
    }

    /// True for the named categories, excluding the general bucket.
    pub fn is_specific(self) -> bool {
        !matches!(self, EmergencyType::General | EmergencyType::None)
    }
}

/// Classification rows, order is significant.
static TYPE_RULES: LazyLock<Vec<(Regex, EmergencyType)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)chest pain|heart attack|cardiac|crushing").unwrap(),
            EmergencyType::Cardiac,
        ),
        (
            Regex::new(r"(?i)can't breathe|not breathing|gasping|wheezing|choking on air")
                .unwrap(),
            EmergencyType::Breathing,
        ),
        (
            Regex::new(r"(?i)bleeding heavily|blood gushing|can't stop bleeding").unwrap(),
            EmergencyType::Bleeding,
        ),
        (
            Regex::new(r"(?i)unconscious|not responsive|passed out|won't wake").unwrap(),
            EmergencyType::Unconscious,
        ),
        (
            Regex::new(r"(?i)choking|can't swallow|stuck in throat").unwrap(),
            EmergencyType::Choking,
        ),
        (
            Regex::new(r"(?i)seizure|convulsing|shaking uncontrollably").unwrap(),
            EmergencyType::Seizure,
        ),
        (
            Regex::new(r"(?i)fell|hit head|car accident|broken bone").unwrap(),
            EmergencyType::Trauma,
        ),
    ]
});

/// Classify `text` into an emergency category.
///
/// First matching row wins; a keyword hit without a row match yields
/// [`EmergencyType::General`]; otherwise [`EmergencyType::None`].
pub fn classify_emergency_type(text: &str) -> EmergencyType {
    for (pattern, category) in TYPE_RULES.iter() {
        if pattern.is_match(text) {
            return *category;
        }
    }
    if matched_keywords(text).is_empty() {
        EmergencyType::None
    } else {
        EmergencyType::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardiac_wins_over_later_rows() {
        // Mentions bleeding too, but the cardiac row is evaluated first.
        assert_eq!(
            classify_emergency_type("chest pain and bleeding heavily"),
            EmergencyType::Cardiac
        );
    }

    #[test]
    fn test_breathing() {
        assert_eq!(
            classify_emergency_type("my son is gasping for air"),
            EmergencyType::Breathing
        );
    }

    #[test]
    fn test_bleeding() {
        assert_eq!(
            classify_emergency_type("the cut won't close, blood gushing everywhere"),
            EmergencyType::Bleeding
        );
    }

    #[test]
    fn test_unconscious() {
        assert_eq!(
            classify_emergency_type("she passed out and won't wake up"),
            EmergencyType::Unconscious
        );
    }

    #[test]
    fn test_choking() {
        assert_eq!(
            classify_emergency_type("something is stuck in throat"),
            EmergencyType::Choking
        );
    }

    #[test]
    fn test_seizure() {
        assert_eq!(
            classify_emergency_type("he is convulsing on the floor"),
            EmergencyType::Seizure
        );
    }

    #[test]
    fn test_trauma() {
        assert_eq!(
            classify_emergency_type("grandma fell down the stairs"),
            EmergencyType::Trauma
        );
    }

    #[test]
    fn test_general_when_only_keywords_match() {
        assert_eq!(
            classify_emergency_type("severe allergic reaction to peanuts"),
            EmergencyType::General
        );
    }

    #[test]
    fn test_none_for_routine_question() {
        assert_eq!(
            classify_emergency_type("how much water should I drink daily"),
            EmergencyType::None
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            classify_emergency_type("HEART ATTACK"),
            EmergencyType::Cardiac
        );
    }

    #[test]
    fn test_is_emergency_predicate() {
        assert!(EmergencyType::Cardiac.is_emergency());
        assert!(EmergencyType::General.is_emergency());
        assert!(!EmergencyType::None.is_emergency());
        assert!(EmergencyType::Seizure.is_specific());
        assert!(!EmergencyType::General.is_specific());
    }
}
