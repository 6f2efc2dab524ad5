//! Additive urgency scoring.
//!
//! Each signal group contributes a fixed bonus and the total is clamped to
//! [`MAX_URGENCY`]. Adding text never lowers a score.

use std::sync::LazyLock;

use regex::Regex;

use crate::classify::classify_emergency_type;
use crate::detector::matched_keywords;

/// Upper bound of the urgency scale.
pub const MAX_URGENCY: u8 = 10;

/// Words that signal the caller wants help now, +2 each.
const HIGH_URGENCY_WORDS: &[&str] = &[
    "immediately",
    "right now",
    "emergency",
    "urgent",
    "critical",
    "severe",
];

static SUDDEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)sudden|just happened|just now").unwrap());

static EXTREME_PAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)10/10|worst pain|excruciating|unbearable").unwrap());

static UNCONSCIOUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)unconscious|unresponsive|passed out").unwrap());

/// Score how urgent `text` sounds, 0 (calm) to 10 (life-threatening).
///
/// Bonuses: +2 per high-urgency word, +1 for suddenness phrasing, +2 for
/// extreme-pain phrasing, +3 for unconsciousness phrasing, +1 per matched
/// emergency keyword capped at +3, and +2 when the text classifies into a
/// specific category like cardiac or choking.
pub fn urgency_score(text: &str) -> u8 {
    let lower = text.to_lowercase();
    let mut score: u32 = 0;

    for word in HIGH_URGENCY_WORDS {
        if lower.contains(word) {
            score += 2;
        }
    }

    if SUDDEN_RE.is_match(text) {
        score += 1;
    }
    if EXTREME_PAIN_RE.is_match(text) {
        score += 2;
    }
    if UNCONSCIOUS_RE.is_match(text) {
        score += 3;
    }

    let keyword_hits = matched_keywords(text).len() as u32;
    score += keyword_hits.min(3);

    if classify_emergency_type(text).is_specific() {
        score += 2;
    }

    score.min(u32::from(MAX_URGENCY)) as u8
}
