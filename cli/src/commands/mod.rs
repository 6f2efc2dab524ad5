//! # CLI Command Implementations
//!
//! This module contains the implementation of all CLI commands.
//! Each submodule represents a top-level command or command group.
//!
//! ## Available Commands
//!
//! - [`ask`] - Ask a first aid question, answered from retrieved sources
//! - [`config`] - Manage CLI configuration (providers, index, threshold)
//! - [`detect`] - Screen a message for emergency signals
//! - [`ingest`] - Load knowledge-base documents into the vector index
//! - [`status`] - Check configuration and backend connectivity
//! - [`triage`] - Interactive emergency triage conversation

pub mod ask;
pub mod config;
pub mod detect;
pub mod ingest;
pub mod status;
pub mod triage;
