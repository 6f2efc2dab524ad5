//! Emergency detection and conversation triage.
//!
//! Pure, synchronous building blocks shared by the answer pipeline and the
//! interactive surfaces:
//!
//! - keyword detection with severity escalation
//! - ordered emergency-type classification
//! - additive urgency scoring
//! - a per-conversation phase machine
//!
//! Nothing here performs I/O; every function is safe to call concurrently.

pub mod classify;
pub mod detector;
pub mod keywords;
pub mod state;
pub mod summary;
pub mod templates;
pub mod urgency;

pub use classify::{classify_emergency_type, EmergencyType};
pub use detector::{detect, matched_keywords, recommended_action, EmergencyDetection, Severity};
pub use keywords::{
    validate_keyword_tables, KeywordTableReport, CRITICAL_KEYWORDS, EMERGENCY_KEYWORDS,
};
pub use state::{EmergencyPhase, EmergencySession, Transition, DEFAULT_URGENCY_THRESHOLD};
pub use summary::{is_emergency_query, summarize_situation, HARD_RULE_KEYWORDS};
pub use templates::response_template;
pub use urgency::{urgency_score, MAX_URGENCY};
