//! # Firstline CLI Library
//!
//! This crate provides the core functionality for the Firstline CLI,
//! a terminal assistant for first aid questions with emergency triage.
//!
//! ## Modules
//!
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration management
//! - [`errors`] - Error handling and display
//! - [`exit_codes`] - Standard exit codes
//! - [`providers`] - Provider construction from configuration

pub mod commands;
pub mod config;
pub mod errors;
pub mod exit_codes;
pub mod providers;

// Re-export commonly used types
pub use config::Config;
