//! # Firstline CLI
//!
//! Firstline — first aid answers when every minute counts
//!
//! Firstline screens every message for emergency signals, answers first aid
//! questions from retrieved medical sources, and falls back to guidance
//! templates when no trustworthy source is available.
//!
//! It is not a substitute for professional medical care.
//!
//! ## Usage
//!
//! ```bash
//! # Ask a first aid question
//! firstline ask "how do I treat a minor burn at home"
//!
//! # Interactive triage conversation
//! firstline triage
//!
//! # Screen a message for emergency signals
//! firstline detect "my chest hurts and my arm is numb"
//! ```

use clap::{Parser, Subcommand};
use firstline::commands;

/// Initialize logger based on verbose flag
fn init_logger(verbose: bool) {
    let mut log_builder = env_logger::Builder::from_default_env();
    if verbose {
        log_builder.filter_level(log::LevelFilter::Debug);
    } else {
        log_builder.filter_level(log::LevelFilter::Info);
    }
    log_builder.init();
}

/// Main CLI structure
#[derive(Parser)]
#[command(name = "firstline")]
#[command(about = "Firstline — first aid answers when every minute counts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Ask a first aid question, answered from retrieved sources
    Ask {
        /// The question to answer
        #[arg(value_name = "QUERY")]
        query: String,
        /// Session ID for log correlation (generated if not provided)
        #[arg(long, short = 's', value_name = "SESSION_ID")]
        session: Option<String>,
        /// Number of sources to retrieve (1-20)
        #[arg(long, value_name = "COUNT")]
        top_k: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Stream the answer token by token
        #[arg(long)]
        stream: bool,
        /// Skip emergency screening (answers are still disclaimed)
        #[arg(long)]
        no_triage: bool,
        /// Enable verbose output
        #[arg(long, short = 'v')]
        verbose: bool,
    },
    /// Screen a message for emergency signals
    Detect {
        /// The message to screen
        #[arg(value_name = "MESSAGE")]
        message: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive emergency triage conversation
    Triage {
        /// Session ID for log correlation (generated if not provided)
        #[arg(long, short = 's', value_name = "SESSION_ID")]
        session: Option<String>,
        /// Urgency score (0-10) at which calling emergency services is suggested
        #[arg(long, value_name = "THRESHOLD")]
        threshold: Option<u8>,
        /// Skip AI answers; guidance templates only
        #[arg(long)]
        no_rag: bool,
        /// Enable verbose output
        #[arg(long, short = 'v')]
        verbose: bool,
    },
    /// Load knowledge-base documents into the vector index
    Ingest {
        /// Path to a JSON array or JSON Lines file of documents
        #[arg(value_name = "FILE")]
        file: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Enable verbose output
        #[arg(long, short = 'v')]
        verbose: bool,
    },
    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Check configuration and backend connectivity
    Status,
}

/// Config subcommands
#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show {
        /// Show full secrets instead of masked values
        #[arg(long)]
        show_secrets: bool,
    },
    /// Configure the embedding provider
    Embedding {
        #[command(subcommand)]
        command: EmbeddingCommands,
    },
    /// Configure the completion provider (OpenRouter)
    Completion {
        /// Model name (e.g., openai/gpt-4o-mini, meta-llama/llama-3.1-70b-instruct)
        #[arg(long, short = 'm', default_value = "openai/gpt-4o-mini")]
        model: String,
        /// API key (optional, prefers OPENROUTER_API_KEY env var)
        #[arg(long, short = 'k')]
        api_key: Option<String>,
        /// API endpoint (defaults to the OpenRouter API)
        #[arg(long, short = 'e')]
        endpoint: Option<String>,
    },
    /// Configure the vector index
    Index {
        /// Index HTTP endpoint URL
        #[arg(long, short = 'e')]
        endpoint: String,
        /// API key (optional, prefers VECTOR_INDEX_API_KEY env var)
        #[arg(long, short = 'k')]
        api_key: Option<String>,
        /// Namespace within the index
        #[arg(long, short = 'n')]
        namespace: Option<String>,
    },
    /// Set the urgency threshold for triage call suggestions (0-10)
    Threshold {
        /// Urgency score at which calling emergency services is suggested
        #[arg(value_name = "VALUE")]
        value: u8,
    },
    /// Remove stored configuration
    Remove,
}

/// Embedding provider subcommands
#[derive(Subcommand)]
enum EmbeddingCommands {
    /// Configure OpenAI as embedding provider
    Openai {
        /// Model name (e.g., text-embedding-3-small, text-embedding-3-large)
        #[arg(long, short = 'm', default_value = "text-embedding-3-small")]
        model: String,
        /// API key (optional, prefers OPENAI_API_KEY env var)
        #[arg(long, short = 'k')]
        api_key: Option<String>,
        /// Embedding dimensions (provider default if not set)
        #[arg(long, short = 'd')]
        dimensions: Option<usize>,
    },
    /// Configure local Ollama as embedding provider
    Ollama {
        /// Ollama API endpoint
        #[arg(long, short = 'e', default_value = "http://localhost:11434")]
        endpoint: String,
        /// Model name (e.g., nomic-embed-text, mxbai-embed-large)
        #[arg(long, short = 'm', default_value = "nomic-embed-text")]
        model: String,
        /// Embedding dimensions (provider default if not set)
        #[arg(long, short = 'd')]
        dimensions: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = run_command(cli.command).await;
    std::process::exit(exit_code);
}

async fn run_command(command: Commands) -> i32 {
    use firstline::exit_codes::*;

    match command {
        Commands::Ask {
            query,
            session,
            top_k,
            json,
            stream,
            no_triage,
            verbose,
        } => {
            let args = commands::ask::AskArgs {
                query,
                session_id: session,
                top_k,
                json,
                stream,
                no_triage,
                verbose,
            };
            init_logger(verbose);
            match commands::ask::execute(args).await {
                Ok(exit_code) => exit_code,
                Err(e) => {
                    eprintln!("Ask error: {}", e);
                    EXIT_ERROR
                }
            }
        }
        Commands::Detect { message, json } => {
            let args = commands::detect::DetectArgs { message, json };
            match commands::detect::execute(args) {
                Ok(exit_code) => exit_code,
                Err(e) => {
                    eprintln!("Detect error: {}", e);
                    EXIT_ERROR
                }
            }
        }
        Commands::Triage {
            session,
            threshold,
            no_rag,
            verbose,
        } => {
            let args = commands::triage::TriageArgs {
                session_id: session,
                threshold,
                no_rag,
                verbose,
            };
            init_logger(verbose);
            match commands::triage::execute(args).await {
                Ok(exit_code) => exit_code,
                Err(e) => {
                    eprintln!("Triage error: {}", e);
                    EXIT_ERROR
                }
            }
        }
        Commands::Ingest {
            file,
            json,
            verbose,
        } => {
            let args = commands::ingest::IngestArgs {
                file,
                json,
                verbose,
            };
            init_logger(verbose);
            match commands::ingest::execute(args).await {
                Ok(exit_code) => exit_code,
                Err(e) => {
                    eprintln!("Ingest error: {}", e);
                    EXIT_ERROR
                }
            }
        }
        Commands::Config { command } => run_config_command(command),
        Commands::Status => match commands::status::execute().await {
            Ok(exit_code) => exit_code,
            Err(e) => {
                eprintln!("Status error: {}", e);
                EXIT_CONFIG_ERROR
            }
        },
    }
}

fn run_config_command(command: ConfigCommands) -> i32 {
    use firstline::exit_codes::*;

    match command {
        ConfigCommands::Show { show_secrets } => {
            let args = commands::config::ConfigShowArgs { show_secrets };
            match commands::config::execute_show(args) {
                Ok(exit_code) => exit_code,
                Err(e) => {
                    eprintln!("Config error: {}", e);
                    EXIT_CONFIG_ERROR
                }
            }
        }
        ConfigCommands::Embedding { command } => run_embedding_command(command),
        ConfigCommands::Completion {
            model,
            api_key,
            endpoint,
        } => {
            let args = commands::config::CompletionArgs {
                model,
                api_key,
                endpoint,
            };
            match commands::config::execute_completion(args) {
                Ok(exit_code) => exit_code,
                Err(e) => {
                    eprintln!("Config error: {}", e);
                    EXIT_CONFIG_ERROR
                }
            }
        }
        ConfigCommands::Index {
            endpoint,
            api_key,
            namespace,
        } => {
            let args = commands::config::IndexArgs {
                endpoint,
                api_key,
                namespace,
            };
            match commands::config::execute_index(args) {
                Ok(exit_code) => exit_code,
                Err(e) => {
                    eprintln!("Config error: {}", e);
                    EXIT_CONFIG_ERROR
                }
            }
        }
        ConfigCommands::Threshold { value } => {
            match commands::config::execute_threshold(value) {
                Ok(exit_code) => exit_code,
                Err(e) => {
                    eprintln!("Config error: {}", e);
                    EXIT_CONFIG_ERROR
                }
            }
        }
        ConfigCommands::Remove => match commands::config::execute_remove() {
            Ok(exit_code) => exit_code,
            Err(e) => {
                eprintln!("Config error: {}", e);
                EXIT_CONFIG_ERROR
            }
        },
    }
}

fn run_embedding_command(command: EmbeddingCommands) -> i32 {
    use commands::config::EmbeddingProviderArg;
    use firstline::exit_codes::*;

    let provider = match command {
        EmbeddingCommands::Openai {
            model,
            api_key,
            dimensions,
        } => EmbeddingProviderArg::OpenAi {
            model,
            api_key,
            dimensions,
        },
        EmbeddingCommands::Ollama {
            endpoint,
            model,
            dimensions,
        } => EmbeddingProviderArg::Ollama {
            endpoint,
            model,
            dimensions,
        },
    };

    match commands::config::execute_embedding(provider) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Config embedding error: {}", e);
            EXIT_CONFIG_ERROR
        }
    }
}
