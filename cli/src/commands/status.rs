//! # Status Command
//!
//! Implements the status command for checking configuration and backend
//! connectivity.
//!
//! ## Usage
//!
//! ```bash
//! firstline status
//! ```

use anyhow::Result;
use colored::Colorize;

use firstline_triage::validate_keyword_tables;

use crate::config::Config;
use crate::exit_codes::*;
use crate::providers::{build_completion, build_index};

/// Execute the status command
///
/// Checks the keyword tables, the stored configuration, and connectivity to
/// the vector index and the completion backend.
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Everything is configured and reachable
/// * `Ok(EXIT_CONFIG_ERROR)` - No configuration or providers incomplete
/// * `Ok(EXIT_NETWORK_ERROR)` - A backend is unreachable
pub async fn execute() -> Result<i32> {
    println!("{}", "Firstline CLI Status".bold());
    println!("{}", "─".repeat(40).dimmed());
    println!();

    // Offline check first: detection works even with no providers at all.
    let report = validate_keyword_tables();
    if report.is_clean() {
        println!(
            "{} Keyword tables: {}",
            "✓".bright_green().bold(),
            "Consistent".green()
        );
    } else {
        println!(
            "{} Keyword tables: {}",
            "✗".red().bold(),
            "Inconsistent".red()
        );
        for duplicate in &report.duplicates {
            println!("  {} Duplicate keyword: {}", "→".cyan(), duplicate);
        }
        for missing in &report.critical_missing {
            println!(
                "  {} Critical term missing from the main table: {}",
                "→".cyan(),
                missing
            );
        }
    }
    println!();

    // Check configuration
    let config = match Config::load() {
        Ok(config) => {
            println!(
                "{} Configuration: {}",
                "✓".bright_green().bold(),
                "Found".green()
            );
            Some(config)
        }
        Err(_) => {
            println!("{} Configuration: {}", "✗".red().bold(), "Not found".red());
            println!(
                "  {} Run `firstline config embedding` to set up providers",
                "→".cyan()
            );
            None
        }
    };

    let Some(config) = config else {
        println!();
        println!(
            "{} Triage and detection work without configuration; `firstline ask` needs it.",
            "ℹ".blue()
        );
        return Ok(EXIT_CONFIG_ERROR);
    };

    // Provider sections
    println!();
    match &config.embedding {
        Some(embedding) if embedding.is_ready() => {
            println!(
                "{} Embedding: {} ({})",
                "✓".bright_green().bold(),
                "Ready".green(),
                embedding.model
            );
        }
        Some(embedding) => {
            println!(
                "{} Embedding: {} ({})",
                "⚠".yellow().bold(),
                "API key missing".yellow(),
                embedding.model
            );
        }
        None => {
            println!(
                "{} Embedding: {}",
                "✗".red().bold(),
                "Not configured".red()
            );
        }
    }

    match &config.completion {
        Some(completion) if completion.is_ready() => {
            println!(
                "{} Completion: {} ({})",
                "✓".bright_green().bold(),
                "Ready".green(),
                completion.model
            );
        }
        Some(completion) => {
            println!(
                "{} Completion: {} ({})",
                "⚠".yellow().bold(),
                "API key missing".yellow(),
                completion.model
            );
        }
        None => {
            println!(
                "{} Completion: {}",
                "✗".red().bold(),
                "Not configured".red()
            );
        }
    }

    match &config.index {
        Some(index) => {
            println!("{} Index: {}", "ℹ".blue(), index.endpoint.cyan());
        }
        None => {
            println!("{} Index: {}", "✗".red().bold(), "Not configured".red());
        }
    }

    if !config.has_pipeline() {
        println!();
        println!(
            "{} Pipeline incomplete. Configure the missing sections above.",
            "✗".red().bold()
        );
        return Ok(EXIT_CONFIG_ERROR);
    }

    // Live checks
    println!();
    let mut unreachable = false;

    match build_index(&config) {
        Ok(index) => match index.stats().await {
            Ok(stats) => {
                println!(
                    "{} Index Status: {} ({} vectors, {} dimensions)",
                    "✓".bright_green().bold(),
                    "Reachable".green(),
                    stats.total_vectors,
                    stats.dimension
                );
            }
            Err(e) => {
                println!(
                    "{} Index Status: {}",
                    "✗".red().bold(),
                    "Unreachable".red()
                );
                println!("  {} {}", "Error:".dimmed(), format!("{}", e).dimmed());
                unreachable = true;
            }
        },
        Err(e) => {
            println!("{} Index Status: {}", "✗".red().bold(), "Not buildable".red());
            println!("  {} {}", "Error:".dimmed(), format!("{}", e).dimmed());
            return Ok(EXIT_CONFIG_ERROR);
        }
    }

    match build_completion(&config) {
        Ok(completion) => match completion.list_models().await {
            Ok(models) => {
                println!(
                    "{} Completion Status: {} ({} models available)",
                    "✓".bright_green().bold(),
                    "Reachable".green(),
                    models.len()
                );
            }
            Err(e) => {
                println!(
                    "{} Completion Status: {}",
                    "✗".red().bold(),
                    "Unreachable".red()
                );
                println!("  {} {}", "Error:".dimmed(), format!("{}", e).dimmed());
                unreachable = true;
            }
        },
        Err(e) => {
            println!(
                "{} Completion Status: {}",
                "✗".red().bold(),
                "Not buildable".red()
            );
            println!("  {} {}", "Error:".dimmed(), format!("{}", e).dimmed());
            return Ok(EXIT_CONFIG_ERROR);
        }
    }

    if unreachable {
        println!();
        println!("{}", "Possible causes:".yellow());
        println!("  • No internet connection");
        println!("  • Backend server is down");
        println!("  • Firewall blocking the connection");
        return Ok(EXIT_NETWORK_ERROR);
    }

    println!();
    println!(
        "{} Ready to answer. Run `firstline ask \"how do I treat a burn\"` to start.",
        "✓".bright_green().bold()
    );

    Ok(EXIT_SUCCESS)
}
