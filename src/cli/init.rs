//! Init command implementation
//!
//! Writes a commented `ragchat.toml` with every default spelled out, and a
//! `.env.example` listing the environment overrides.

use super::output::Output;
use crate::utils::toml_config::DEFAULT_CONFIG_FILE;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// ragchat.toml already exists and --force was not given
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing ragchat");

    let base_path = &config.path;

    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.error(&format!("Failed to create {}: {}", base_path.display(), e));
            return InitResult::Error(e.to_string());
        }
    }

    let config_path = base_path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", DEFAULT_CONFIG_FILE));
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    if let Err(e) = write_file(&config_path, &generate_ragchat_toml(), config.force) {
        output.error(&format!("Failed to create {}: {}", DEFAULT_CONFIG_FILE, e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", DEFAULT_CONFIG_FILE);

    let env_example_path = base_path.join(".env.example");
    if env_example_path.exists() && !config.force {
        output.skipped(".env.example", "already exists");
    } else if let Err(e) = write_file(&env_example_path, &generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    } else {
        output.created("env", ".env.example");
    }

    output.complete("ragchat initialized");

    output.header("Next Steps");
    output.newline();
    output.info("1. Start Ollama and pull the chat model:");
    output.command("ollama serve");
    output.command("ollama pull llama3.2:latest");
    output.newline();
    output.info("2. Chat with a folder of documents:");
    output.command("ragchat chat --docs ./documents");

    output.hint("Type 'skip' at the folder prompt to reuse the last index");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_ragchat_toml() -> String {
    r#"# ragchat configuration
# Every value below is the built-in default; delete what you do not change.

[llm]
# Ollama server (env: OLLAMA_URL)
base_url = "http://localhost:11434"
# Chat model (env: RAGCHAT_MODEL, flag: --model)
model = "llama3.2:latest"
temperature = 0.3

[embeddings]
# "fastembed" runs a local ONNX model; "ollama" uses the server in [llm]
backend = "fastembed"
model = "sentence-transformers/all-MiniLM-L6-v2"

[rag]
chunk_size = 1000
chunk_overlap = 100
# Chunks retrieved per question
top_k = 3
# Drop chunks scoring below this (cosine, -1.0 to 1.0); unset keeps all top_k
# min_score = 0.5
embed_batch_size = 64
collection = "documents"

[index]
# Where the index is persisted (env: RAGCHAT_INDEX_DIR, flag: --index-dir)
dir = "./db/ragchat_index"

[chat]
# Messages of history sent to the model; 0 sends all of them
history_window = 0
# List retrieved chunks under each answer
show_sources = false

[logging]
# Used when RUST_LOG is unset
level = "warn"
# "text" or "json"
format = "text"
"#
    .to_string()
}

fn generate_env_example() -> String {
    r#"# ragchat environment variables
# Copy this file to .env; values here override ragchat.toml.

# OLLAMA_URL=http://localhost:11434
# RAGCHAT_MODEL=llama3.2:latest
# RAGCHAT_INDEX_DIR=./db/ragchat_index

# Logging filter (trace, debug, info, warn, error)
# RUST_LOG=ragchat=info
"#
    .to_string()
}
