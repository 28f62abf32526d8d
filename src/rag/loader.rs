//! Document loading
//!
//! Turns the files of one folder into plain text. The loader is picked from
//! the file extension, case-insensitively:
//!
//! | Extension      | Loader                                              |
//! |----------------|-----------------------------------------------------|
//! | `.pdf`         | `pdf-extract`                                       |
//! | `.doc`/`.docx` | `word/document.xml` of the OOXML zip, via quick-xml |
//! | anything else  | UTF-8 text                                          |

use crate::types::{AppError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Text of one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    /// Full path of the file
    pub source: PathBuf,
    /// File name
    pub title: String,
    pub text: String,
}

/// Loader chosen for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Word,
    Text,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => DocumentKind::Pdf,
            Some("doc") | Some("docx") => DocumentKind::Word,
            _ => DocumentKind::Text,
        }
    }
}

/// Load every file directly inside `folder`, sorted by file name.
///
/// Sub-directories and dot-files are skipped. Any file that fails to load
/// fails the whole folder.
#[instrument(skip_all, fields(folder = %folder.display()))]
pub fn load_folder(folder: &Path) -> Result<Vec<LoadedDocument>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            debug!(path = %path.display(), "Skipping non-file entry");
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            debug!(path = %path.display(), "Skipping hidden file");
            continue;
        }
        paths.push(path);
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let documents = paths
        .iter()
        .map(|path| load_file(path))
        .collect::<Result<Vec<_>>>()?;

    info!(files = documents.len(), "Loaded documents");
    Ok(documents)
}

/// Load a single file with the loader for its extension.
pub fn load_file(path: &Path) -> Result<LoadedDocument> {
    let kind = DocumentKind::from_path(path);
    debug!(path = %path.display(), ?kind, "Loading file");

    let bytes = fs::read(path)?;
    let text = match kind {
        DocumentKind::Pdf => extract_pdf_text(&bytes),
        DocumentKind::Word => extract_docx_text(&bytes),
        DocumentKind::Text => String::from_utf8(bytes)
            .map_err(|_| AppError::Document("file is not valid UTF-8 text".to_string())),
    }
    .map_err(|e| match e {
        AppError::Document(msg) => AppError::Document(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;

    let title = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(LoadedDocument {
        source: path.to_path_buf(),
        title,
        text,
    })
}

/// Extract text from PDF bytes using pdf-extract.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| AppError::Document(e.to_string()))
}

/// Extract text from a `.docx` (OOXML) file.
///
/// Legacy binary `.doc` files are not zip archives and are rejected.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(|e| {
        AppError::Document(format!("not an OOXML Word document ({})", e))
    })?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| AppError::Document(format!("missing word/document.xml ({})", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| AppError::Document(format!("unreadable word/document.xml ({})", e)))?;

    word_xml_to_text(&xml)
}

/// Flatten WordprocessingML to text: text runs are kept, `w:tab` becomes a
/// tab, `w:br` and the end of each `w:p` become newlines.
pub fn word_xml_to_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_run => {
                let run = e
                    .unescape()
                    .map_err(|e| AppError::Document(format!("bad text in document.xml ({})", e)))?;
                text.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AppError::Document(format!(
                    "malformed document.xml at {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(text.trim_end().to_string())
}
