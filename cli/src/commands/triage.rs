//! # Triage Command
//!
//! Interactive emergency triage session. Each message moves a phase machine
//! from listening through urgency assessment to call suggestions, and stays
//! engaged until the user reports that help has arrived.
//!
//! Works without configured providers: phase guidance and fixed templates
//! still print, only the tailored AI answers are skipped.
//!
//! ## Usage
//!
//! ```bash
//! firstline triage
//!
//! # Lower the bar for suggesting an emergency call
//! firstline triage --threshold 3
//! ```

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;

use firstline_rag::{MemoryStore, RagPipeline, RagRequest, RateLimiter};
use firstline_triage::{
    is_emergency_query, response_template, EmergencyPhase, EmergencySession, Severity, Transition,
};

use crate::commands::ask::output_formatted;
use crate::config::Config;
use crate::errors::{display_rag_error, display_warning};
use crate::exit_codes::*;
use crate::providers::build_pipeline;

/// Arguments for the triage command
#[derive(Debug)]
pub struct TriageArgs {
    /// Session identifier; a fresh UUID when absent
    pub session_id: Option<String>,
    /// Urgency threshold for suggesting an emergency call
    pub threshold: Option<u8>,
    /// Phase machine only, no AI answers
    pub no_rag: bool,
    /// Verbose output
    pub verbose: bool,
}

/// Execute the triage command
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Session ended normally
pub async fn execute(args: TriageArgs) -> Result<i32> {
    let config = Config::load_or_default();
    let threshold = args
        .threshold
        .unwrap_or_else(|| config.effective_urgency_threshold());
    let session_id = args
        .session_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let mut session = EmergencySession::with_threshold(&session_id, threshold);

    let pipeline = if args.no_rag {
        None
    } else {
        match build_pipeline(&config) {
            Ok(pipeline) => Some(pipeline),
            Err(e) => {
                display_warning(&format!(
                    "AI answers unavailable ({e}); continuing with guidance templates only"
                ));
                None
            }
        }
    };
    let limiter = RateLimiter::new(Arc::new(MemoryStore::default()));

    println!();
    println!("{}", "Firstline Triage".bold().underline());
    println!("{}", "─".repeat(40).dimmed());
    println!("Describe what is happening. I will assess it message by message.");
    println!(
        "{}",
        "Type 'exit' to quit, 'reset' to start over.".dimmed()
    );
    println!();

    if args.verbose {
        eprintln!("{} Session: {}", "→".cyan(), session_id);
        eprintln!("{} Call threshold: {}/10", "→".cyan(), threshold);
    }

    let stdin = std::io::stdin();
    let mut reader = stdin.lock();

    loop {
        print!("{} ", "You:".bold());
        std::io::stdout().flush().ok();

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            // EOF
            println!();
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_quit(input) {
            break;
        }
        if input.eq_ignore_ascii_case("reset") {
            session.reset();
            println!("{} Session reset. I'm listening.", "ℹ".blue().bold());
            println!();
            continue;
        }

        let transition = session.transition(input);
        if args.verbose {
            eprintln!(
                "{} Phase: {:?} -> {:?} (urgency {}/10)",
                "→".cyan(),
                transition.previous_phase,
                transition.phase,
                transition.urgency
            );
        }
        render_transition(&transition, input);

        if transition.phase == EmergencyPhase::End {
            println!(
                "{} Glad help has arrived. Take care; ending the session.",
                "✓".green().bold()
            );
            println!();
            break;
        }

        if let Some(ref pipeline) = pipeline {
            if engages_ai(transition.phase) {
                if let Err(e) = limiter.check(&session_id).await {
                    display_rag_error(&e);
                    continue;
                }
                answer(pipeline, &session_id, input, args.verbose).await;
            }
        }
    }

    Ok(EXIT_SUCCESS)
}

/// Whether the user asked to leave the session
fn is_quit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit")
        || input.eq_ignore_ascii_case("quit")
        || input.eq_ignore_ascii_case("bye")
}

/// Phases where a tailored AI answer adds something beyond the template
fn engages_ai(phase: EmergencyPhase) -> bool {
    matches!(
        phase,
        EmergencyPhase::DetectingUrgency
            | EmergencyPhase::ProvidingGuidance
            | EmergencyPhase::SuggestCall
            | EmergencyPhase::ContinueUntilHelp
    )
}

/// Print the guidance matching the phase the message moved us into
fn render_transition(transition: &Transition, input: &str) {
    match transition.phase {
        EmergencyPhase::Listening => {
            println!(
                "{} No emergency signs so far. Tell me more if something feels wrong.",
                "✓".green()
            );
            println!();
        }
        EmergencyPhase::DetectingUrgency | EmergencyPhase::ProvidingGuidance => {
            println!(
                "{} Possible {:?} emergency, urgency {}/10. I have a few more questions while we assess.",
                "⚠".yellow().bold(),
                transition.emergency_type,
                transition.urgency
            );
            println!();
        }
        EmergencyPhase::SuggestCall => {
            let severity = is_emergency_query(input)
                .map(|detection| detection.severity)
                .unwrap_or(Severity::Urgent);
            println!("{}", response_template(severity));
            println!();
        }
        EmergencyPhase::ContinueUntilHelp => {
            println!(
                "{} Help is on the way. Stay with them; I'm here until responders arrive.",
                "✓".green().bold()
            );
            println!();
        }
        EmergencyPhase::End => {}
    }
}

/// Produce a tailored AI answer for this message
async fn answer(pipeline: &RagPipeline, session_id: &str, input: &str, verbose: bool) {
    let detection = is_emergency_query(input);
    let mut request = RagRequest::new(session_id, input);

    let result = match detection {
        Some(detection) if detection.is_critical() => {
            pipeline.handle_emergency_query(&request, &detection).await
        }
        other => {
            request.emergency = other;
            pipeline.handle_query(&request).await
        }
    };

    match result {
        Ok(result) => output_formatted(&result, verbose),
        Err(e) => display_rag_error(&e),
    }
}
