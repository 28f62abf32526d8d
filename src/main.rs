//! ragchat CLI entry point
//!
//! - `ragchat` / `ragchat chat` - pick or build an index, then chat
//! - `ragchat ingest <dir>` - build the index and exit
//! - `ragchat init` - scaffold ragchat.toml and .env.example
//! - `ragchat config` - print or validate the effective configuration

use ragchat::{
    chat::{
        setup::{prepare_index, select_source, SourceChoice, NO_INDEX_MESSAGE},
        ChatSession,
    },
    cli::{
        init::{self, InitConfig, InitResult},
        output::Output,
        ChatArgs, Cli, Commands,
    },
    db::index_exists,
    rag::{chain::RagChain, embeddings::EmbeddingProvider, retriever::Retriever},
    utils::logging,
    AppError, LLMClient, Provider, RagChatConfig, Result,
};
use std::io;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    let output = Output::from_flag(cli.no_color);

    if let Err(e) = run(cli, &output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    if let Some(Commands::Init { ref path, force }) = cli.command {
        let init_config = InitConfig {
            path: path.clone(),
            force,
        };
        return match init::run(init_config, output) {
            InitResult::Success | InitResult::AlreadyExists => Ok(()),
            InitResult::Error(e) => Err(AppError::Internal(e)),
        };
    }

    dotenvy::dotenv().ok();

    let config = load_config(&cli)?;
    logging::init(&config.logging, cli.verbose);

    match cli.command {
        None => run_chat(config, ChatArgs::default()).await,
        Some(Commands::Chat(args)) => run_chat(config, args).await,
        Some(Commands::Ingest { dir }) => run_ingest(config, &dir, output).await,
        Some(Commands::Config { validate }) => show_config(&config, &cli.config, validate, output),
        Some(Commands::Init { .. }) => Ok(()),
    }
}

/// File, then environment, then command-line flags.
fn load_config(cli: &Cli) -> Result<RagChatConfig> {
    let mut config = RagChatConfig::load(&cli.config)?;
    config.apply_env_overrides();

    if let Some(ref model) = cli.model {
        config.llm.model = model.clone();
    }
    if let Some(ref dir) = cli.index_dir {
        config.index.dir = dir.clone();
    }

    Ok(config)
}

async fn run_chat(config: RagChatConfig, args: ChatArgs) -> Result<()> {
    config.validate()?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let choice = match (args.docs, args.reuse) {
        (Some(folder), _) => {
            if !folder.exists() {
                return Err(AppError::InvalidInput(format!(
                    "Folder '{}' does not exist.",
                    folder.display()
                )));
            }
            SourceChoice::Folder(folder)
        }
        (None, true) => {
            if !index_exists(&config.index.dir) {
                return Err(AppError::NotFound(NO_INDEX_MESSAGE.to_string()));
            }
            SourceChoice::Reuse
        }
        (None, false) => match select_source(&mut input, &mut out, &config.index.dir)? {
            Some(choice) => choice,
            None => return Ok(()),
        },
    };

    let embedder = EmbeddingProvider::from_config(&config)
        .create_embedder()
        .await?;
    let (store, _) = prepare_index(&choice, &config.index.dir, &config.rag, embedder.clone()).await?;

    let llm: Arc<dyn LLMClient> = Provider::from_config(&config.llm).create_client().await?.into();
    let retriever = Retriever::from_config(&config.rag, store, embedder);
    let chain = RagChain::new(llm, retriever).with_history_window(config.chat.history_window);

    let mut session = ChatSession::new(chain).with_show_sources(config.chat.show_sources);
    session.run(&mut input, &mut out).await
}

async fn run_ingest(config: RagChatConfig, dir: &Path, output: &Output) -> Result<()> {
    config.validate()?;

    if !dir.exists() {
        return Err(AppError::InvalidInput(format!(
            "Folder '{}' does not exist.",
            dir.display()
        )));
    }

    output.info(&format!("Indexing {}", dir.display()));

    let embedder = EmbeddingProvider::from_config(&config)
        .create_embedder()
        .await?;
    let choice = SourceChoice::Folder(dir.to_path_buf());
    let (_, report) = prepare_index(&choice, &config.index.dir, &config.rag, embedder).await?;

    let report = report.unwrap_or_default();
    if report.chunks == 0 {
        output.warning("No text found; the index is empty");
    } else {
        output.success(&format!(
            "Indexed {} files into {} chunks",
            report.files, report.chunks
        ));
    }
    output.kv("Index", &config.index.dir.display().to_string());

    Ok(())
}

fn show_config(
    config: &RagChatConfig,
    path: &Path,
    validate: bool,
    output: &Output,
) -> Result<()> {
    config.validate()?;

    if validate {
        output.success(&format!("{} is valid", path.display()));
        return Ok(());
    }

    output.header("Configuration");
    output.kv("File", &path.display().to_string());
    output.kv(
        "Loaded",
        if path.exists() { "yes" } else { "no (defaults)" },
    );
    output.newline();
    println!("{}", config.to_toml_string()?);

    Ok(())
}
