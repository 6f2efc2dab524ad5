//! Conversation triage phase machine.
//!
//! Tracks where a monitored conversation stands, from passive listening
//! through call escalation to help arriving. Transitions re-evaluate the
//! latest message only; the machine holds no history beyond the current
//! phase. `END` is terminal and is left via [`EmergencySession::reset`]
//! alone.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classify::{classify_emergency_type, EmergencyType};
use crate::detector::matched_keywords;
use crate::urgency::urgency_score;

/// Escalation trigger used when none is configured.
pub const DEFAULT_URGENCY_THRESHOLD: u8 = 5;

/// Urgency that pulls an already-guided conversation into call escalation.
const GUIDANCE_ESCALATION_THRESHOLD: u8 = 7;

static CALLED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)called|calling|on the phone").unwrap());

static ARRIVED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)arrived|here now|they're here").unwrap());

/// Phase of a triaged conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmergencyPhase {
    Listening,
    DetectingUrgency,
    ProvidingGuidance,
    SuggestCall,
    ContinueUntilHelp,
    End,
}

/// Per-conversation triage state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencySession {
    pub session_id: String,
    pub phase: EmergencyPhase,
    pub emergency_type: EmergencyType,
    pub urgency: u8,
    #[serde(skip, default = "threshold_from_env")]
    urgency_threshold: u8,
}

/// Outcome of feeding one message through [`EmergencySession::transition`].
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub phase: EmergencyPhase,
    pub previous_phase: EmergencyPhase,
    pub emergency_type: EmergencyType,
    pub urgency: u8,
    /// Set when this step escalated into `SUGGEST_CALL`.
    pub requires_call: bool,
    pub keywords: Vec<String>,
}

impl EmergencySession {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self::with_threshold(session_id, threshold_from_env())
    }

    /// Session with an explicit escalation threshold instead of the
    /// `URGENCY_THRESHOLD` environment default.
    pub fn with_threshold(session_id: impl Into<String>, urgency_threshold: u8) -> Self {
        Self {
            session_id: session_id.into(),
            phase: EmergencyPhase::Listening,
            emergency_type: EmergencyType::None,
            urgency: 0,
            urgency_threshold,
        }
    }

    pub fn phase(&self) -> EmergencyPhase {
        self.phase
    }

    /// Drop back to `LISTENING`. The only way out of `END`.
    pub fn reset(&mut self) {
        self.phase = EmergencyPhase::Listening;
        self.emergency_type = EmergencyType::None;
        self.urgency = 0;
    }

    /// Advance the phase machine with the latest user message.
    pub fn transition(&mut self, text: &str) -> Transition {
        let previous_phase = self.phase;
        let emergency_type = classify_emergency_type(text);
        let urgency = urgency_score(text);
        let mut requires_call = false;

        let next = match self.phase {
            EmergencyPhase::Listening if emergency_type.is_emergency() => {
                EmergencyPhase::DetectingUrgency
            }
            EmergencyPhase::DetectingUrgency => {
                if urgency >= self.urgency_threshold {
                    requires_call = true;
                    EmergencyPhase::SuggestCall
                } else {
                    EmergencyPhase::ProvidingGuidance
                }
            }
            EmergencyPhase::ProvidingGuidance if urgency >= GUIDANCE_ESCALATION_THRESHOLD => {
                requires_call = true;
                EmergencyPhase::SuggestCall
            }
            EmergencyPhase::SuggestCall if CALLED_RE.is_match(text) => {
                EmergencyPhase::ContinueUntilHelp
            }
            EmergencyPhase::ContinueUntilHelp if ARRIVED_RE.is_match(text) => EmergencyPhase::End,
            phase => phase,
        };

        if next != previous_phase {
            log::info!(
                "triage transition session={} {:?} -> {:?} type={:?} urgency={}",
                self.session_id,
                previous_phase,
                next,
                emergency_type,
                urgency
            );
        }

        self.phase = next;
        self.emergency_type = emergency_type;
        self.urgency = urgency;

        Transition {
            phase: next,
            previous_phase,
            emergency_type,
            urgency,
            requires_call,
            keywords: matched_keywords(text),
        }
    }
}

fn threshold_from_env() -> u8 {
    std::env::var("URGENCY_THRESHOLD")
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(DEFAULT_URGENCY_THRESHOLD)
}
