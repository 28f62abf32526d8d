//! Console chat front end.
//!
//! Reads from any [`BufRead`] and writes to any [`Write`], so the same loop
//! drives stdin/stdout in the binary and byte buffers in tests.

pub mod setup;

use crate::memory::ChatHistory;
use crate::rag::chain::{RagAnswer, RagChain};
use crate::types::Result;
use std::io::{self, BufRead, Write};
use tracing::{debug, instrument};

pub const BANNER_RULE: &str = "====================";
pub const BANNER_TITLE: &str = "RAG CHATBOT";
pub const USER_PROMPT: &str = "\n\nYou : ";
pub const BOT_PREFIX: &str = "\n\nBot: ";

/// `exit` or `quit`, in any case. Surrounding spaces are not ignored.
pub fn is_exit_command(line: &str) -> bool {
    let line = line.to_lowercase();
    line == "exit" || line == "quit"
}

/// Next line without its terminator, or `None` at end of input.
pub(crate) fn read_input_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}

/// One interactive conversation over an index.
pub struct ChatSession {
    chain: RagChain,
    history: ChatHistory,
    show_sources: bool,
}

impl ChatSession {
    pub fn new(chain: RagChain) -> Self {
        Self {
            chain,
            history: ChatHistory::new(),
            show_sources: false,
        }
    }

    /// List the retrieved chunks under each answer.
    pub fn with_show_sources(mut self, show: bool) -> Self {
        self.show_sources = show;
        self
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Run until `exit`, `quit` or end of input.
    ///
    /// # Errors
    ///
    /// I/O failures and any error from the chain end the session.
    #[instrument(skip_all)]
    pub async fn run<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<()> {
        writeln!(output, "{}", BANNER_RULE)?;
        writeln!(output, "{}", BANNER_TITLE)?;
        writeln!(output, "{}", BANNER_RULE)?;

        loop {
            write!(output, "{}", USER_PROMPT)?;
            output.flush()?;

            let Some(query) = read_input_line(input)? else {
                writeln!(output)?;
                break;
            };

            if is_exit_command(&query) {
                break;
            }

            let answer = self.chain.invoke(&query, &self.history).await?;
            writeln!(output, "{}{}", BOT_PREFIX, answer.answer)?;

            if self.show_sources {
                write_sources(output, &answer)?;
            }

            self.history.record_turn(&query, &answer.answer);
            debug!(turns = self.history.turns(), "Turn recorded");
        }

        Ok(())
    }
}

fn write_sources<W: Write>(output: &mut W, answer: &RagAnswer) -> io::Result<()> {
    if answer.context.is_empty() {
        return Ok(());
    }

    writeln!(output, "\nSources:")?;
    for (i, hit) in answer.context.iter().enumerate() {
        writeln!(
            output,
            "  [{}] {} (chunk {}, score {:.3})",
            i + 1,
            hit.document.metadata.title,
            hit.document.metadata.chunk_index,
            hit.score
        )?;
    }
    Ok(())
}
