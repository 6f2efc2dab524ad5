//! # Ingest Command
//!
//! Loads knowledge-base entries from a JSON file, embeds them and upserts
//! them into the vector index.
//!
//! ## Usage
//!
//! ```bash
//! # A JSON array of objects (text, question/answer pairs, ...)
//! firstline ingest first_aid_kb.json
//!
//! # JSON Lines works too
//! firstline ingest first_aid_kb.jsonl --json
//! ```

use std::collections::HashMap;

use anyhow::Result;
use colored::Colorize;
use serde_json::Value;

use crate::config::Config;
use crate::errors::{display_config_error, display_rag_error, exit_code_for};
use crate::exit_codes::*;
use crate::providers::build_pipeline;

/// Arguments for the ingest command
#[derive(Debug)]
pub struct IngestArgs {
    /// Path to the JSON or JSON Lines file
    pub file: String,
    /// Output JSON instead of formatted text
    pub json: bool,
    /// Verbose output
    pub verbose: bool,
}

/// Execute the ingest command
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Documents ingested
/// * `Ok(EXIT_CONFIG_ERROR)` - Providers not configured
/// * `Ok(EXIT_INVALID_INPUT)` - File missing or not parseable
pub async fn execute(args: IngestArgs) -> Result<i32> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "{} Not configured. Run the `firstline config` commands first.",
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

    let contents = match std::fs::read_to_string(&args.file) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!(
                "{} Cannot read {}: {}",
                "Error:".red().bold(),
                args.file.cyan(),
                e
            );
            return Ok(EXIT_INVALID_INPUT);
        }
    };

    let entries = match parse_entries(&contents) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!(
                "{} {} is not a JSON array or JSON Lines file: {}",
                "Error:".red().bold(),
                args.file.cyan(),
                e
            );
            return Ok(EXIT_INVALID_INPUT);
        }
    };

    if entries.is_empty() {
        println!("{} Nothing to ingest: {} is empty.", "ℹ".blue(), args.file);
        return Ok(EXIT_SUCCESS);
    }

    if args.verbose {
        eprintln!(
            "{} Embedding {} entries from {}",
            "→".cyan(),
            entries.len(),
            args.file
        );
    }

    match pipeline.ingest(entries).await {
        Ok(accepted) => {
            if args.json {
                println!("{}", serde_json::json!({ "ingested": accepted }));
            } else {
                println!(
                    "{} Ingested {} documents into the index.",
                    "✓".green().bold(),
                    accepted.to_string().cyan()
                );
            }
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            display_rag_error(&e);
            Ok(exit_code_for(&e))
        }
    }
}

/// Parse a JSON array of objects, falling back to JSON Lines
fn parse_entries(contents: &str) -> Result<Vec<HashMap<String, Value>>, serde_json::Error> {
    match serde_json::from_str::<Vec<HashMap<String, Value>>>(contents) {
        Ok(entries) => Ok(entries),
        Err(array_err) => {
            let mut entries = Vec::new();
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<HashMap<String, Value>>(line) {
                    Ok(entry) => entries.push(entry),
                    // Report the array error; it names the real format problem.
                    Err(_) => return Err(array_err),
                }
            }
            Ok(entries)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries_array() {
        let entries = parse_entries(r#"[{"text": "CPR basics"}, {"text": "burn care"}]"#).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["text"], "CPR basics");
    }

    #[test]
    fn test_parse_entries_jsonl() {
        let contents = "{\"text\": \"CPR basics\"}\n\n{\"question\": \"how to treat a burn\", \"answer\": \"cool water\"}\n";
        let entries = parse_entries(contents).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["answer"], "cool water");
    }

    #[test]
    fn test_parse_entries_rejects_garbage() {
        assert!(parse_entries("not json at all").is_err());
    }

    #[test]
    fn test_parse_entries_empty_input() {
        let entries = parse_entries("").unwrap_or_default();
        assert!(entries.is_empty());
    }
}
