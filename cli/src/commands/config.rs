//! # Config Command
//!
//! Manages CLI configuration: the embedding provider, the completion
//! provider, the vector index endpoint, and the triage urgency threshold.
//!
//! ## Usage
//!
//! ```bash
//! # Show current configuration
//! firstline config show
//!
//! # Configure OpenAI embeddings
//! firstline config embedding openai --model text-embedding-3-small
//!
//! # Configure local Ollama embeddings
//! firstline config embedding ollama --endpoint http://localhost:11434 --model nomic-embed-text
//!
//! # Configure the completion model and vector index
//! firstline config completion --model openai/gpt-4o-mini
//! firstline config index --endpoint https://index.example.com
//!
//! # Tune when triage suggests calling emergency services (0-10)
//! firstline config threshold 4
//!
//! # Remove stored configuration
//! firstline config remove
//! ```

use anyhow::Result;
use colored::Colorize;

use crate::config::{mask_key, CompletionConfig, Config, EmbeddingConfig, IndexConfig};
use crate::errors::display_validation_error;
use crate::exit_codes::*;

/// Arguments for the config show command
#[derive(Debug)]
pub struct ConfigShowArgs {
    /// Show full API keys (default: masked)
    pub show_secrets: bool,
}

/// Embedding provider types for configuration
#[derive(Debug, Clone)]
pub enum EmbeddingProviderArg {
    /// OpenAI embeddings API (text-embedding-3-small, etc.)
    OpenAi {
        model: String,
        api_key: Option<String>,
        dimensions: Option<usize>,
    },
    /// Local Ollama instance
    Ollama {
        endpoint: String,
        model: String,
        dimensions: Option<usize>,
    },
}

/// Arguments for the config completion command
#[derive(Debug)]
pub struct CompletionArgs {
    pub model: String,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
}

/// Arguments for the config index command
#[derive(Debug)]
pub struct IndexArgs {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub namespace: Option<String>,
}

/// Execute the config show command
///
/// Displays all current configuration settings.
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Configuration displayed successfully
pub fn execute_show(args: ConfigShowArgs) -> Result<i32> {
    let config = Config::load_or_default();

    println!();
    println!("{}", "Firstline Configuration".bold().underline());
    println!();

    println!("{}", "Embedding".cyan().bold());
    if let Some(ref embedding) = config.embedding {
        println!("  {} {}", "Provider:".dimmed(), embedding.provider);
        println!("  {} {}", "Model:".dimmed(), embedding.model);
        if let Some(ref endpoint) = embedding.endpoint {
            println!("  {} {}", "Endpoint:".dimmed(), endpoint);
        }
        if let Some(dimensions) = embedding.dimensions {
            println!("  {} {}", "Dimensions:".dimmed(), dimensions);
        }
        show_key_lines(
            embedding.api_key_env.as_deref(),
            embedding.api_key.as_deref(),
            args.show_secrets,
        );
        let ready = if embedding.is_ready() {
            "✓ ready".green()
        } else {
            "✗ not ready (API key missing)".red()
        };
        println!("  {} {}", "Status:".dimmed(), ready);
    } else {
        println!("  {}", "Not configured".dimmed());
        println!();
        println!("  {} Configure with:", "→".cyan());
        println!("    firstline config embedding openai --model text-embedding-3-small");
        println!(
            "    firstline config embedding ollama --endpoint http://localhost:11434 --model nomic-embed-text"
        );
    }
    println!();

    println!("{}", "Completion".cyan().bold());
    if let Some(ref completion) = config.completion {
        println!("  {} {}", "Provider:".dimmed(), completion.provider);
        println!("  {} {}", "Model:".dimmed(), completion.model);
        if let Some(ref endpoint) = completion.endpoint {
            println!("  {} {}", "Endpoint:".dimmed(), endpoint);
        }
        show_key_lines(
            completion.api_key_env.as_deref(),
            completion.api_key.as_deref(),
            args.show_secrets,
        );
        let ready = if completion.is_ready() {
            "✓ ready".green()
        } else {
            "✗ not ready (API key missing)".red()
        };
        println!("  {} {}", "Status:".dimmed(), ready);
    } else {
        println!("  {}", "Not configured".dimmed());
        println!();
        println!("  {} Configure with:", "→".cyan());
        println!("    firstline config completion --model openai/gpt-4o-mini");
    }
    println!();

    println!("{}", "Vector Index".cyan().bold());
    if let Some(ref index) = config.index {
        println!("  {} {}", "Endpoint:".dimmed(), index.endpoint);
        if let Some(ref namespace) = index.namespace {
            println!("  {} {}", "Namespace:".dimmed(), namespace);
        }
        show_key_lines(
            index.api_key_env.as_deref(),
            index.api_key.as_deref(),
            args.show_secrets,
        );
    } else {
        println!("  {}", "Not configured".dimmed());
        println!();
        println!("  {} Configure with:", "→".cyan());
        println!("    firstline config index --endpoint https://index.example.com");
    }
    println!();

    println!("{}", "Triage".cyan().bold());
    let threshold = config.effective_urgency_threshold();
    if config.urgency_threshold.is_some() {
        println!("  {} {}/10", "Urgency threshold:".dimmed(), threshold);
    } else {
        println!(
            "  {} {}/10 {}",
            "Urgency threshold:".dimmed(),
            threshold,
            "(default)".dimmed()
        );
    }
    println!();

    Ok(EXIT_SUCCESS)
}

/// Print the API key lines shared by every provider section
fn show_key_lines(api_key_env: Option<&str>, api_key: Option<&str>, show_secrets: bool) {
    if let Some(env_var) = api_key_env {
        let has_key = std::env::var(env_var).is_ok();
        let status = if has_key {
            "✓ set".green().to_string()
        } else {
            "✗ not set".red().to_string()
        };
        println!("  {} {} ({})", "API Key Env:".dimmed(), env_var, status);
    }
    if let Some(key) = api_key {
        let display = if show_secrets {
            key.to_string()
        } else {
            mask_key(key)
        };
        println!("  {} {}", "API Key:".dimmed(), display);
    }
}

/// Execute the config embedding command
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Provider saved
pub fn execute_embedding(provider: EmbeddingProviderArg) -> Result<i32> {
    let embedding = embedding_config_from(provider);

    let provider_name = embedding.provider.clone();
    let model_name = embedding.model.clone();
    let ready = embedding.is_ready();
    let key_env = embedding.api_key_env.clone();

    let mut config = Config::load_or_default();
    config.embedding = Some(embedding);
    config.save()?;

    println!();
    println!(
        "{} Embedding provider configured successfully!",
        "✓".green().bold()
    );
    println!();
    println!("  {} {}", "Provider:".dimmed(), provider_name);
    println!("  {} {}", "Model:".dimmed(), model_name);

    if !ready {
        println!();
        eprintln!(
            "{} API key not found. Set the {} environment variable.",
            "⚠".yellow().bold(),
            key_env.as_deref().unwrap_or("API_KEY")
        );
    }
    println!();

    Ok(EXIT_SUCCESS)
}

/// Build an [`EmbeddingConfig`] from command-line arguments
fn embedding_config_from(provider: EmbeddingProviderArg) -> EmbeddingConfig {
    match provider {
        EmbeddingProviderArg::OpenAi {
            model,
            api_key,
            dimensions,
        } => {
            let mut cfg = EmbeddingConfig::openai(&model);
            if let Some(key) = api_key {
                cfg.api_key = Some(key);
            }
            cfg.dimensions = dimensions;
            cfg
        }
        EmbeddingProviderArg::Ollama {
            endpoint,
            model,
            dimensions,
        } => {
            let mut cfg = EmbeddingConfig::ollama(&endpoint, &model);
            cfg.dimensions = dimensions;
            cfg
        }
    }
}

/// Execute the config completion command
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Provider saved
pub fn execute_completion(args: CompletionArgs) -> Result<i32> {
    let mut completion = CompletionConfig::openrouter(&args.model);
    if let Some(key) = args.api_key {
        completion.api_key = Some(key);
    }
    completion.endpoint = args.endpoint;

    let model_name = completion.model.clone();
    let ready = completion.is_ready();
    let key_env = completion.api_key_env.clone();

    let mut config = Config::load_or_default();
    config.completion = Some(completion);
    config.save()?;

    println!();
    println!(
        "{} Completion provider configured successfully!",
        "✓".green().bold()
    );
    println!();
    println!("  {} {}", "Model:".dimmed(), model_name);

    if ready {
        println!();
        println!("  {} Ready to use with `firstline ask`", "→".cyan());
    } else {
        println!();
        eprintln!(
            "{} API key not found. Set the {} environment variable.",
            "⚠".yellow().bold(),
            key_env.as_deref().unwrap_or("API_KEY")
        );
    }
    println!();

    Ok(EXIT_SUCCESS)
}

/// Execute the config index command
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Index settings saved
pub fn execute_index(args: IndexArgs) -> Result<i32> {
    let mut index = IndexConfig::new(&args.endpoint);
    if let Some(key) = args.api_key {
        index.api_key = Some(key);
    }
    index.namespace = args.namespace;

    let endpoint = index.endpoint.clone();

    let mut config = Config::load_or_default();
    config.index = Some(index);
    config.save()?;

    println!();
    println!(
        "{} Vector index configured successfully!",
        "✓".green().bold()
    );
    println!();
    println!("  {} {}", "Endpoint:".dimmed(), endpoint);
    println!();

    Ok(EXIT_SUCCESS)
}

/// Execute the config threshold command
///
/// Urgency scores run 0-10; triage suggests calling emergency services once
/// a score reaches the threshold.
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Threshold saved
/// * `Ok(EXIT_INVALID_INPUT)` - Value out of range
pub fn execute_threshold(value: u8) -> Result<i32> {
    if value > 10 {
        display_validation_error("Urgency threshold must be between 0 and 10");
        return Ok(EXIT_INVALID_INPUT);
    }

    let mut config = Config::load_or_default();
    config.urgency_threshold = Some(value);
    config.save()?;

    println!();
    println!(
        "{} Urgency threshold set to {}/10.",
        "✓".green().bold(),
        value
    );
    println!();

    Ok(EXIT_SUCCESS)
}

/// Execute the config remove command
///
/// Deletes the configuration file entirely.
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Removed or nothing to remove
pub fn execute_remove() -> Result<i32> {
    if !Config::exists() {
        println!();
        println!("{} No configuration file found.", "ℹ".blue());
        println!();
        return Ok(EXIT_SUCCESS);
    }

    Config::delete()?;

    println!();
    println!("{} Configuration removed.", "✓".green().bold());
    println!();

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_config_from_openai_args() {
        let cfg = embedding_config_from(EmbeddingProviderArg::OpenAi {
            model: "text-embedding-3-small".to_string(),
            api_key: Some("sk-test".to_string()),
            dimensions: Some(512),
        });
        assert_eq!(cfg.provider, "openai");
        assert_eq!(cfg.model, "text-embedding-3-small");
        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.dimensions, Some(512));
        assert_eq!(cfg.api_key_env.as_deref(), Some("OPENAI_API_KEY"));
    }

    #[test]
    fn test_embedding_config_from_ollama_args() {
        let cfg = embedding_config_from(EmbeddingProviderArg::Ollama {
            endpoint: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: None,
        });
        assert_eq!(cfg.provider, "ollama");
        assert_eq!(cfg.endpoint.as_deref(), Some("http://localhost:11434"));
        assert!(cfg.api_key_env.is_none());
        assert!(cfg.is_ready());
    }

    #[test]
    fn test_embedding_provider_arg_openai() {
        let provider = EmbeddingProviderArg::OpenAi {
            model: "text-embedding-3-small".to_string(),
            api_key: None,
            dimensions: None,
        };
        match provider {
            EmbeddingProviderArg::OpenAi { model, api_key, .. } => {
                assert_eq!(model, "text-embedding-3-small");
                assert!(api_key.is_none());
            }
            _ => panic!("Expected OpenAI provider"),
        }
    }

    #[test]
    fn test_threshold_rejects_out_of_range() {
        let code = execute_threshold(11).unwrap();
        assert_eq!(code, EXIT_INVALID_INPUT);
    }
}
