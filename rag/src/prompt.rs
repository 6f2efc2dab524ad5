//! Prompt assembly.
//!
//! Every string the completion model sees is built here: the grounded
//! answer prompts with per-tier guidance, the model-only fallback prompts,
//! and the emergency bypass prompts. Safety wording is part of the product
//! contract, so the templates change deliberately, not incidentally.

use crate::types::{Candidate, ConfidenceLevel};

/// Render retrieved candidates as a numbered context block.
pub fn build_context(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            format!(
                "[Source {}] (relevance: {:.3})\n{}",
                index + 1,
                candidate.score,
                candidate.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// How strongly the model should lean on the retrieved context.
fn context_guidance(level: ConfidenceLevel) -> &'static str {
    match level {
        ConfidenceLevel::High => {
            "Use the provided medical knowledge context as your primary source. \
             The sources are highly relevant."
        }
        ConfidenceLevel::Partial => {
            "Use the provided medical knowledge context where applicable, but \
             supplement with your medical knowledge as the sources may not be \
             perfectly matched."
        }
        _ => {
            "The provided sources have low relevance. Primarily use your medical \
             knowledge, but reference sources if they contain useful information."
        }
    }
}

const EMERGENCY_MODE_BLOCK: &str = "\n\nEMERGENCY MODE ACTIVE:\n\
- Start your response with: \"\u{1f6a8} CALL EMERGENCY SERVICES IMMEDIATELY (911/112/108)\"\n\
- Focus on immediate life-saving actions\n\
- Be extremely clear and brief\n\
- Only include critical actions\n\
- Do not include non-essential information";

/// System prompt for the grounded answer path.
pub fn build_system_prompt(level: ConfidenceLevel, emergency: bool) -> String {
    let mut prompt = format!(
        "You are a medical AI assistant helping with first aid and health questions.\n\n\
         CRITICAL SAFETY RULES:\n\
         1. NEVER provide definitive diagnoses - say \"likely\" or \"possible\"\n\
         2. NEVER prescribe medications or dosages\n\
         3. ALWAYS recommend emergency services (911/112/108) for serious situations\n\
         4. {}\n\
         5. State uncertainty clearly when present\n\n\
         Your role:\n\
         - Provide clear, evidence-based first-aid guidance\n\
         - Highlight key clinical findings\n\
         - Suggest relevant diagnostic tests\n\
         - Recommend next steps (urgent care, ER, or specialist)\n\
         - Keep answers simple and actionable\n\
         - Prioritize safety first",
        context_guidance(level)
    );

    if emergency {
        prompt.push_str(EMERGENCY_MODE_BLOCK);
    }
    prompt
}

/// Per-tier answering instructions for the user prompt.
fn tier_instructions(level: ConfidenceLevel) -> &'static str {
    match level {
        ConfidenceLevel::High => {
            "- Answer primarily from the provided sources\n\
             - Note which source supports key points where helpful"
        }
        ConfidenceLevel::Partial => {
            "- Combine the provided sources with your medical knowledge\n\
             - Note where the sources do not fully cover the question"
        }
        _ => {
            "- Rely primarily on your medical knowledge\n\
             - Mention the sources only where they genuinely help"
        }
    }
}

/// User prompt for the grounded answer path.
pub fn build_user_prompt(
    query: &str,
    context: &str,
    level: ConfidenceLevel,
    emergency: bool,
) -> String {
    let emergency_note = if emergency {
        "\n- THIS IS AN EMERGENCY - prioritize immediate safety actions"
    } else {
        ""
    };

    format!(
        "Medical Knowledge Context:\n{context}\n\n\
         User Question: {query}\n\n\
         Instructions:\n{}\n\
         - Provide clear, actionable guidance\n\
         - State confidence level if relevant{emergency_note}\n\n\
         Answer:",
        tier_instructions(level)
    )
}

/// System prompt for the model-only fallback path.
pub fn build_fallback_system_prompt(emergency: bool) -> String {
    let mut prompt = "You are a medical AI assistant answering WITHOUT verified \
                      knowledge-base sources.\n\n\
                      Follow these rules exactly:\n\
                      1. Label the answer \"Model-based — not source-backed\"\n\
                      2. State the likely condition with a confidence level (High/Moderate/Low)\n\
                      3. List up to 3 key supporting findings\n\
                      4. List up to 3 confirmatory tests\n\
                      5. Recommend next steps (urgent care, ER, or specialist)\n\
                      6. Include the disclaimer: \"This is not a definitive diagnosis; consult a clinician.\"\n\
                      7. Do NOT give self-treatment instructions beyond basic first aid\n\
                      8. Do NOT express false certainty"
        .to_string();

    if emergency {
        prompt.push_str(EMERGENCY_MODE_BLOCK);
    }
    prompt
}

/// User prompt for the model-only fallback path, with a note about what
/// retrieval produced.
pub fn build_fallback_user_prompt(query: &str, weak_candidates: &[Candidate]) -> String {
    let sources_note = if weak_candidates.is_empty() {
        "No sources were retrieved from the knowledge base.".to_string()
    } else {
        format!(
            "{} source(s) were retrieved but scored below the relevance threshold (< 0.60), \
             so they are not reliable for this question.",
            weak_candidates.len()
        )
    };

    format!(
        "User Question: {query}\n\n\
         {sources_note}\n\n\
         Respond in this structure:\n\
         **Model-based — not source-backed** (Confidence: High/Moderate/Low)\n\n\
         **Assessment:**\n\
         [likely condition or explanation]\n\n\
         **Key Supporting Findings:**\n\
         [1-3 findings]\n\n\
         **Confirmatory Tests:**\n\
         [1-3 tests]\n\n\
         **Immediate Recommendations:**\n\
         [next steps]\n\n\
         **Safety Note:**\n\
         [disclaimer]"
    )
}

/// System prompt for the emergency bypass handler.
pub fn emergency_system_prompt() -> &'static str {
    "You are Firstline, an emergency first-aid assistant. Your only job is to keep \
     the user safe until professional responders arrive. Use calm, clear sentences. \
     Never provide clinical diagnoses or anything that requires professional tools. \
     Encourage calling emergency services immediately."
}

/// User prompt for the emergency bypass handler.
pub fn build_emergency_user_prompt(message: &str, situation: &str) -> String {
    format!(
        "The user said: \"{message}\"\n\n\
         Based on their message, this looks like {situation}.\n\n\
         Follow these rules:\n\
         1. Firmly tell them to call emergency services now and mention 911 (US), 112 (EU), or 108 (India).\n\
         2. Refer explicitly to their situation. Do NOT invent facts they did not mention.\n\
         3. Ask 2-4 short yes/no safety questions, including at least one specific to their situation.\n\
         4. Give only universally safe first-aid actions. For burns: cool the area with clean running water. Never give invasive or medication advice.\n\
         5. Tell them to stay with the person, describe what they see, and wait for responders.\n\n\
         Use short sentences (prefer under 15 words). Avoid technical jargon."
    )
}
