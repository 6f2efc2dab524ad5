//! # Detect Command
//!
//! One-shot emergency detection over a single message. Prints the verdict
//! and exits with a code scripts can branch on.
//!
//! ## Usage
//!
//! ```bash
//! firstline detect "my chest hurts and I can't breathe"
//!
//! # JSON verdict for wrappers
//! firstline detect "paper cut on my finger" --json
//! ```

use anyhow::Result;
use colored::Colorize;

use firstline_triage::{
    classify_emergency_type, is_emergency_query, urgency_score, Severity,
};

use crate::exit_codes::*;

/// Arguments for the detect command
#[derive(Debug)]
pub struct DetectArgs {
    /// The message to screen
    pub message: String,
    /// Output JSON instead of formatted text
    pub json: bool,
}

/// Execute the detect command
///
/// # Returns
///
/// * `Ok(EXIT_EMERGENCY_DETECTED)` - An emergency was detected
/// * `Ok(EXIT_SUCCESS)` - No emergency detected
pub fn execute(args: DetectArgs) -> Result<i32> {
    let detection = is_emergency_query(&args.message);
    let emergency_type = classify_emergency_type(&args.message);
    let urgency = urgency_score(&args.message);

    if args.json {
        let output = serde_json::json!({
            "detected": detection.is_some(),
            "detection": detection,
            "emergency_type": emergency_type,
            "urgency": urgency,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(match detection {
            Some(_) => EXIT_EMERGENCY_DETECTED,
            None => EXIT_SUCCESS,
        });
    }

    match detection {
        Some(detection) => {
            println!();
            match detection.severity {
                Severity::Critical => {
                    println!(
                        "{} {}",
                        "🚨".red(),
                        "CRITICAL EMERGENCY DETECTED".red().bold()
                    );
                }
                Severity::Urgent => {
                    println!("{} {}", "⚠".yellow(), "Emergency detected".yellow().bold());
                }
            }
            println!();
            println!(
                "  {} {:?}",
                "Type:".dimmed(),
                emergency_type
            );
            println!("  {} {}/10", "Urgency:".dimmed(), urgency);
            if !detection.keywords.is_empty() {
                println!(
                    "  {} {}",
                    "Keywords:".dimmed(),
                    detection.keywords.join(", ")
                );
            }
            if !detection.critical_keywords.is_empty() {
                println!(
                    "  {} {}",
                    "Critical keywords:".dimmed(),
                    detection.critical_keywords.join(", ").red()
                );
            }
            println!();
            println!(
                "  {} {}",
                "→".cyan(),
                detection.recommended_action.bold()
            );
            println!();
            Ok(EXIT_EMERGENCY_DETECTED)
        }
        None => {
            println!();
            println!("{} No emergency detected.", "✓".green().bold());
            println!("  {} Urgency score: {}/10", "→".dimmed(), urgency);
            println!();
            Ok(EXIT_SUCCESS)
        }
    }
}
