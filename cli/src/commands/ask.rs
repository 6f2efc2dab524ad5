//! # Ask Command
//!
//! Implements the ask command: one question in, one grounded answer out.
//! Every message is screened for emergencies first; critical messages skip
//! retrieval entirely and get the emergency fast path.
//!
//! ## Usage
//!
//! ```bash
//! # Ask a first-aid question
//! firstline ask "how do I treat a minor burn?"
//!
//! # Stream the answer as it generates
//! firstline ask "what are the signs of dehydration?" --stream
//!
//! # Get the full result envelope as JSON
//! firstline ask "how to splint a sprained ankle" --json
//! ```

use anyhow::Result;
use colored::Colorize;
use futures::StreamExt;
use std::io::Write;
use termimad::MadSkin;

use firstline_rag::{
    ConfidenceLevel, RagRequest, RagResult, ResponseLabel, MEDICAL_DISCLAIMER,
};
use firstline_triage::{is_emergency_query, response_template, Severity};

use crate::config::Config;
use crate::errors::{display_config_error, display_rag_error, exit_code_for};
use crate::exit_codes::*;
use crate::providers::build_pipeline;

/// Arguments for the ask command
#[derive(Debug)]
pub struct AskArgs {
    /// The question to answer
    pub query: String,
    /// Session identifier; a fresh UUID when absent
    pub session_id: Option<String>,
    /// Override the configured retrieval depth
    pub top_k: Option<usize>,
    /// Output JSON instead of formatted text
    pub json: bool,
    /// Stream tokens as they generate
    pub stream: bool,
    /// Skip emergency screening
    pub no_triage: bool,
    /// Verbose output
    pub verbose: bool,
}

/// Execute the ask command
///
/// # Arguments
///
/// * `args` - Command arguments
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Answer produced
/// * `Ok(EXIT_CONFIG_ERROR)` - Providers not configured
/// * `Ok(EXIT_INVALID_INPUT)` - Query rejected (e.g. empty)
/// * `Ok(EXIT_NETWORK_ERROR)` - Cannot reach a provider
/// * `Ok(EXIT_SERVICE_UNAVAILABLE)` - A provider errored
pub async fn execute(args: AskArgs) -> Result<i32> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "{} Not configured. Run `firstline config embedding`, `config completion` and `config index` first.",
                "Error:".red().bold()
            );
            if args.verbose {
                eprintln!("  {}: {}", "Details".dimmed(), e);
            }
            return Ok(EXIT_CONFIG_ERROR);
        }
    };

    let pipeline = match build_pipeline(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            display_config_error(&e.to_string());
            return Ok(EXIT_CONFIG_ERROR);
        }
    };

    let session_id = args
        .session_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    if args.verbose {
        eprintln!("{} Session: {}", "→".cyan(), session_id);
        eprintln!("{} Querying: {}", "→".cyan(), args.query);
    }

    // Emergency screening comes before anything touches the network.
    let detection = if args.no_triage {
        None
    } else {
        is_emergency_query(&args.query)
    };

    let mut request = RagRequest::new(session_id, args.query.clone());
    request.top_k = args.top_k;

    if let Some(detection) = detection {
        if args.verbose {
            eprintln!(
                "{} Triage: {:?} emergency detected (keywords: {})",
                "→".cyan(),
                detection.severity,
                detection.keywords.join(", ")
            );
        }

        if detection.is_critical() {
            // Critical messages never wait on retrieval. Show the fixed
            // guidance immediately, then the tailored answer.
            if !args.json {
                println!();
                println!("{}", response_template(Severity::Critical));
            }
            return match pipeline.handle_emergency_query(&request, &detection).await {
                Ok(result) => {
                    if args.json {
                        output_json(&result)?;
                    } else {
                        output_formatted(&result, args.verbose);
                    }
                    Ok(EXIT_SUCCESS)
                }
                Err(e) => {
                    display_rag_error(&e);
                    Ok(exit_code_for(&e))
                }
            };
        }

        if !args.json {
            println!();
            println!("{}", response_template(Severity::Urgent));
        }
        request.emergency = Some(detection);
    }

    if args.stream && !args.json {
        return stream_answer(&pipeline, &request, args.verbose).await;
    }

    match pipeline.handle_query(&request).await {
        Ok(result) => {
            if args.json {
                output_json(&result)?;
            } else {
                output_formatted(&result, args.verbose);
            }
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            display_rag_error(&e);
            Ok(exit_code_for(&e))
        }
    }
}

/// Stream the answer tokens to stdout, then print the grounding footer
async fn stream_answer(
    pipeline: &firstline_rag::RagPipeline,
    request: &RagRequest,
    verbose: bool,
) -> Result<i32> {
    let (envelope, mut stream) = match pipeline.handle_query_stream(request).await {
        Ok(parts) => parts,
        Err(e) => {
            display_rag_error(&e);
            return Ok(exit_code_for(&e));
        }
    };

    println!();
    println!(
        "{} {} {}",
        "🩺".green(),
        "Firstline".bold().underline(),
        format!("({})", envelope.model).dimmed()
    );
    println!();

    let mut stdout = std::io::stdout();
    while let Some(token) = stream.next().await {
        match token {
            Ok(token) => {
                print!("{token}");
                stdout.flush().ok();
            }
            Err(e) => {
                println!();
                display_rag_error(&e);
                return Ok(exit_code_for(&e));
            }
        }
    }
    println!();
    println!("{}", MEDICAL_DISCLAIMER.trim_start().dimmed());
    println!();

    print_result_footer(&envelope, verbose);
    Ok(EXIT_SUCCESS)
}

/// Output the result envelope as JSON
fn output_json(result: &RagResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{}", json);
    Ok(())
}

/// Maximum width for markdown rendering
const MARKDOWN_MAX_WIDTH: usize = 80;

/// Create a styled skin for terminal markdown rendering
fn create_markdown_skin() -> MadSkin {
    let mut skin = MadSkin::default();
    // Customize colors for better terminal appearance
    skin.set_headers_fg(termimad::crossterm::style::Color::Cyan);
    skin.bold.set_fg(termimad::crossterm::style::Color::White);
    skin.italic
        .set_fg(termimad::crossterm::style::Color::Yellow);
    skin.code_block.set_fgbg(
        termimad::crossterm::style::Color::Green,
        termimad::crossterm::style::Color::Reset,
    );
    skin
}

/// Render markdown text with a maximum width
fn render_markdown(text: &str) {
    let skin = create_markdown_skin();
    let area = termimad::Area::new(0, 0, MARKDOWN_MAX_WIDTH as u16, u16::MAX);
    let fmt_text = termimad::FmtText::from(&skin, text, Some(area.width as usize));
    print!("{}", fmt_text);
}

/// Short display name for a response label
fn label_str(label: ResponseLabel) -> &'static str {
    match label {
        ResponseLabel::Grounded => "grounded",
        ResponseLabel::PartiallyGrounded => "partially grounded",
        ResponseLabel::LowGrounded => "low grounding",
        ResponseLabel::ModelFallback => "model fallback",
        ResponseLabel::EmergencyBypass => "emergency bypass",
    }
}

/// One-line source excerpt for the footer
fn source_excerpt(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > 100 {
        let mut excerpt: String = flat.chars().take(100).collect();
        excerpt.push_str("...");
        excerpt
    } else {
        flat
    }
}

/// Output the answer as formatted text
pub(crate) fn output_formatted(result: &RagResult, verbose: bool) {
    println!();
    println!(
        "{} {} {}",
        "🩺".green(),
        "Firstline".bold().underline(),
        format!("({})", result.model).dimmed()
    );
    println!();

    render_markdown(&result.response);
    println!();

    print_result_footer(result, verbose);
}

/// Print the grounding footer: warning, confidence line, sources
fn print_result_footer(result: &RagResult, verbose: bool) {
    if let Some(ref warning) = result.warning {
        println!("{}", warning.yellow());
        println!();
    }

    let confidence = match result.confidence_level {
        ConfidenceLevel::High => "high".green().to_string(),
        ConfidenceLevel::Partial => "partial".yellow().to_string(),
        ConfidenceLevel::Low => "low".yellow().to_string(),
        ConfidenceLevel::Fallback => "fallback".red().to_string(),
        ConfidenceLevel::Emergency => "emergency".red().bold().to_string(),
    };
    println!(
        "{} {} {} {}",
        "Confidence:".dimmed(),
        confidence,
        "· Answer:".dimmed(),
        label_str(result.response_label)
    );
    if let Some(score) = result.top_score {
        println!("{} {:.3}", "Top source relevance:".dimmed(), score);
    }

    if let Some(ref details) = result.emergency_details {
        println!();
        println!(
            "{} {}",
            "🚨".red(),
            details.recommended_action.red().bold()
        );
    }

    if !result.sources.is_empty() {
        println!();
        println!("{}", "Sources".bold());
        println!("{}", "─".repeat(50).dimmed());
        for (idx, source) in result.sources.iter().enumerate() {
            let match_pct = (source.score * 100.0).round() as i32;
            println!(
                "  {} {} {}",
                format!("{}.", idx + 1).bright_white(),
                source_excerpt(&source.text),
                format!("({}% match)", match_pct).dimmed()
            );
        }
    }

    if verbose {
        println!();
        println!("{} {}", "Session:".dimmed(), result.session_id.dimmed());
        println!(
            "{} {}",
            "Timestamp:".dimmed(),
            result.timestamp.to_rfc3339().dimmed()
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_args_defaults() {
        let args = AskArgs {
            query: "test query".to_string(),
            session_id: None,
            top_k: None,
            json: false,
            stream: false,
            no_triage: false,
            verbose: false,
        };
        assert_eq!(args.query, "test query");
        assert!(args.session_id.is_none());
        assert!(args.top_k.is_none());
        assert!(!args.json);
        assert!(!args.stream);
        assert!(!args.no_triage);
        assert!(!args.verbose);
    }

    #[test]
    fn test_label_str_covers_all_labels() {
        assert_eq!(label_str(ResponseLabel::Grounded), "grounded");
        assert_eq!(
            label_str(ResponseLabel::PartiallyGrounded),
            "partially grounded"
        );
        assert_eq!(label_str(ResponseLabel::LowGrounded), "low grounding");
        assert_eq!(label_str(ResponseLabel::ModelFallback), "model fallback");
        assert_eq!(
            label_str(ResponseLabel::EmergencyBypass),
            "emergency bypass"
        );
    }

    #[test]
    fn test_source_excerpt_flattens_and_truncates() {
        let short = source_excerpt("line one\nline two");
        assert_eq!(short, "line one line two");

        let long = source_excerpt(&"x".repeat(150));
        assert_eq!(long.chars().count(), 103);
        assert!(long.ends_with("..."));
    }
}
