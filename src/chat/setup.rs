//! Choosing what to chat over: a fresh index built from a folder, or the
//! index left by a previous run.

use super::read_input_line;
use crate::db::{index_exists, RagVectorStore, VectorStore};
use crate::rag::embeddings::Embedder;
use crate::rag::indexer::{IndexReport, Indexer};
use crate::types::Result;
use crate::utils::toml_config::RagConfig;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub const SOURCE_PROMPT: &str = "Enter the folder path containing documents (or type 'skip'): ";
pub const NO_INDEX_MESSAGE: &str =
    "No existing database found. You have to specify documents to start chatting.";

/// Answer to the source prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceChoice {
    /// Reuse the persisted index.
    Reuse,
    /// Build a new index from this folder.
    Folder(PathBuf),
}

impl SourceChoice {
    /// `skip` in any case means reuse; anything else is taken as a path,
    /// verbatim.
    pub fn parse(line: &str) -> Self {
        if line.to_lowercase() == "skip" {
            SourceChoice::Reuse
        } else {
            SourceChoice::Folder(PathBuf::from(line))
        }
    }
}

/// Prompt until the answer is usable.
///
/// `skip` is only accepted when an index exists under `index_dir`, and a
/// folder only when the path exists. Returns `None` at end of input.
pub fn select_source<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    index_dir: &Path,
) -> Result<Option<SourceChoice>> {
    loop {
        write!(output, "{}", SOURCE_PROMPT)?;
        output.flush()?;

        let Some(line) = read_input_line(input)? else {
            writeln!(output)?;
            return Ok(None);
        };

        match SourceChoice::parse(&line) {
            SourceChoice::Reuse => {
                if !index_exists(index_dir) {
                    writeln!(output, "{}", NO_INDEX_MESSAGE)?;
                    continue;
                }
                return Ok(Some(SourceChoice::Reuse));
            }
            SourceChoice::Folder(path) => {
                if !path.exists() {
                    writeln!(output, "Folder '{}' does not exist.", line)?;
                    continue;
                }
                return Ok(Some(SourceChoice::Folder(path)));
            }
        }
    }
}

/// Open or build the index for `choice` under `index_dir`.
///
/// Reusing never touches any document folder. Building replaces whatever
/// the directory held for the configured collection.
pub async fn prepare_index(
    choice: &SourceChoice,
    index_dir: &Path,
    config: &RagConfig,
    embedder: Arc<dyn Embedder>,
) -> Result<(Arc<dyn VectorStore>, Option<IndexReport>)> {
    match choice {
        SourceChoice::Reuse => {
            let store = Indexer::open_existing(index_dir).await?;
            Ok((Arc::new(store), None))
        }
        SourceChoice::Folder(folder) => {
            let store: Arc<dyn VectorStore> =
                Arc::new(RagVectorStore::open(Some(index_dir.to_path_buf())).await?);
            let indexer = Indexer::from_config(config, Arc::clone(&store), embedder)?;
            let report = indexer.build(folder).await?;
            info!(folder = %folder.display(), chunks = report.chunks, "Indexed folder");
            Ok((store, Some(report)))
        }
    }
}
