//! # Error Handling
//!
//! This module provides user-friendly error display functions and the
//! mapping from pipeline errors to exit codes.

use colored::Colorize;
use firstline_rag::RagError;

use crate::exit_codes::*;

/// Map a pipeline error onto the exit code contract
pub fn exit_code_for(error: &RagError) -> i32 {
    match error {
        RagError::InvalidQuery(_) => EXIT_INVALID_INPUT,
        RagError::Http(_) => EXIT_NETWORK_ERROR,
        RagError::RateLimited(_) => EXIT_RATE_LIMITED,
        RagError::Embedding(_) | RagError::Index(_) | RagError::Completion(_) => {
            EXIT_SERVICE_UNAVAILABLE
        }
        RagError::Serialization(_) => EXIT_ERROR,
    }
}

/// Display a pipeline error with the suggestions matching its kind
pub fn display_rag_error(error: &RagError) {
    match error {
        RagError::InvalidQuery(message) => display_validation_error(message),
        RagError::Http(_) => display_network_error(&error.to_string()),
        RagError::RateLimited(_) => {
            eprintln!("{} {}", "✗".red().bold(), error);
            eprintln!();
            eprintln!(
                "{} Wait a minute before sending more messages.",
                "Tip:".cyan().bold()
            );
        }
        _ => display_service_error(&error.to_string()),
    }
}

/// Display a network error with helpful suggestions
///
/// # Arguments
///
/// * `message` - The error message to display
pub fn display_network_error(message: &str) {
    eprintln!("{} Network error: {}", "✗".red().bold(), message);
    eprintln!();
    eprintln!("{}", "Possible causes:".yellow());
    eprintln!("  • No internet connection");
    eprintln!("  • Provider endpoint is unreachable");
    eprintln!("  • Firewall blocking the connection");
    eprintln!();
    eprintln!(
        "{} Check your connection and try again.",
        "Tip:".cyan().bold()
    );
}

/// Display a configuration error with helpful suggestions
///
/// # Arguments
///
/// * `message` - The error message to display
pub fn display_config_error(message: &str) {
    eprintln!("{} Configuration error: {}", "✗".red().bold(), message);
    eprintln!();
    eprintln!("{}", "Possible causes:".yellow());
    eprintln!("  • Configuration file is corrupted");
    eprintln!("  • A provider section is missing");
    eprintln!();
    eprintln!(
        "{} Run `firstline config show` to inspect the current settings.",
        "Tip:".cyan().bold()
    );
}

/// Display a service unavailable error with helpful suggestions
///
/// # Arguments
///
/// * `message` - The error message to display
pub fn display_service_error(message: &str) {
    eprintln!("{} Service unavailable: {}", "✗".red().bold(), message);
    eprintln!();
    eprintln!("{}", "Possible causes:".yellow());
    eprintln!("  • Provider API is down or overloaded");
    eprintln!("  • API key is invalid or out of quota");
    eprintln!();
    eprintln!(
        "{} Run `firstline status` to check provider connectivity.",
        "Tip:".cyan().bold()
    );
}

/// Display a validation error with helpful suggestions
///
/// # Arguments
///
/// * `message` - The error message to display
pub fn display_validation_error(message: &str) {
    eprintln!("{} Invalid request: {}", "✗".red().bold(), message);
    eprintln!();
    eprintln!(
        "{} Check the command options and try again.",
        "Tip:".cyan().bold()
    );
}

/// Display a generic error
///
/// # Arguments
///
/// * `message` - The error message to display
pub fn display_error(message: &str) {
    eprintln!("{} Error: {}", "✗".red().bold(), message);
}

/// Display a warning
///
/// # Arguments
///
/// * `message` - The warning message to display
pub fn display_warning(message: &str) {
    eprintln!("{} Warning: {}", "⚠".yellow().bold(), message);
}

/// Display a success message
///
/// # Arguments
///
/// * `message` - The success message to display
pub fn display_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Display an info message
///
/// # Arguments
///
/// * `message` - The info message to display
pub fn display_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
