//! CLI module for ragchat
//!
//! Command-line parsing for the `ragchat` binary, using clap for arguments
//! and owo-colors for status output.

pub mod init;
pub mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::toml_config::DEFAULT_CONFIG_FILE;

/// ragchat - chat with your documents
///
/// Indexes a folder of PDF, Word and text files and answers questions about
/// them with a local Ollama model.
#[derive(Parser, Debug)]
#[command(
    name = "ragchat",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "ragchat - chat with your documents",
    long_about = "Conversational question answering over a folder of documents.\n\n\
                  Run without arguments to start a chat session: you will be asked for a\n\
                  folder to index, or 'skip' to reuse the index from a previous run.",
    after_help = "EXAMPLES:\n    \
                  ragchat                        # Interactive chat (prompts for a folder)\n    \
                  ragchat chat --docs ./papers   # Index ./papers, then chat\n    \
                  ragchat chat --reuse           # Chat over the existing index\n    \
                  ragchat ingest ./papers        # Build the index and exit\n    \
                  ragchat init                   # Write ragchat.toml and .env.example"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    /// Directory holding the persisted index (overrides config)
    #[arg(long, global = true)]
    pub index_dir: Option<PathBuf>,

    /// Ollama model used for answers (overrides config)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat with your documents (the default)
    Chat(ChatArgs),

    /// Build the index from a folder and exit
    Ingest {
        /// Folder containing the documents
        dir: PathBuf,
    },

    /// Write a starter ragchat.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Config {
        /// Only validate the configuration
        #[arg(long)]
        validate: bool,
    },
}

/// Pre-answers for the index prompt.
#[derive(Args, Debug, Default, Clone)]
pub struct ChatArgs {
    /// Index this folder instead of asking
    #[arg(long, conflicts_with = "reuse")]
    pub docs: Option<PathBuf>,

    /// Reuse the existing index instead of asking
    #[arg(long)]
    pub reuse: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
