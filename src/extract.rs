//! Document extraction
//!
//! Walks a folder and turns every supported file into cleaned sentences:
//! - plain text (`txt`, `md`) is used as-is
//! - tabular files (`csv`) must contain a `,` or `;` separator
//! - markup (`xml`, `html`) must start with `<` and has its tags stripped
//! - PDF text is pulled page by page; files without text are skipped
//!
//! Other files are decoded as UTF-8, falling back to Latin-1. Sentences at
//! or below the minimum length are dropped.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use crossbeam::channel::Sender;
use ignore::WalkBuilder;
use regex::Regex;
use crate::{Error, Result};
use crate::ui::{ProgressMessage, ProgressPhase};

/// Sentences must be longer than this many characters
pub const DEFAULT_MIN_SENTENCE_LENGTH: usize = 10;

const DEFAULT_EXTENSIONS: &[&str] = &["txt", "md", "csv", "xml", "html", "htm", "pdf"];

/// Sentence extractor for a folder of documents
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    min_sentence_length: usize,
    extensions: Vec<String>,
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExtractor {
    /// Create an extractor with default settings
    pub fn new() -> Self {
        Self {
            min_sentence_length: DEFAULT_MIN_SENTENCE_LENGTH,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn with_min_sentence_length(mut self, min_sentence_length: usize) -> Self {
        self.min_sentence_length = min_sentence_length;
        self
    }

    /// Check if a file extension is handled
    pub fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|s| s.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    /// List the supported files under `root`, honouring `.gitignore`
    pub fn collect_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("folder '{}' does not exist or is not accessible", root.display()),
            )));
        }

        let mut files = Vec::new();
        for entry in WalkBuilder::new(root).build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let path = entry.into_path();
            if self.supports(&path) {
                files.push(path);
            } else {
                tracing::debug!("Skipping unsupported file {}", path.display());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Extract `(source_path, sentence)` pairs from every supported file
    /// under `root`.
    ///
    /// Files that cannot be read are logged and skipped.
    pub fn scan_folder(
        &self,
        root: &Path,
        progress: Option<&Sender<ProgressMessage>>,
    ) -> Result<Vec<(String, String)>> {
        let files = self.collect_files(root)?;
        if let Some(tx) = progress {
            tx.send(ProgressMessage::Started { phase: ProgressPhase::Extracting, total: files.len() }).ok();
        }

        let mut pairs = Vec::new();
        for (idx, path) in files.iter().enumerate() {
            let source = path.display().to_string();
            match self.extract_file(path) {
                Ok(sentences) => {
                    tracing::debug!("Extracted {} sentences from {}", sentences.len(), source);
                    pairs.extend(sentences.into_iter().map(|s| (source.clone(), s)));
                }
                Err(e) => {
                    tracing::warn!("Failed to extract {}: {}", source, e);
                    if let Some(tx) = progress {
                        tx.send(ProgressMessage::Error(format!("Skipped {}: {}", source, e))).ok();
                    }
                }
            }

            if let Some(tx) = progress {
                tx.send(ProgressMessage::Progress {
                    phase: ProgressPhase::Extracting,
                    current: idx + 1,
                    file: Some(source),
                })
                .ok();
            }
        }

        if let Some(tx) = progress {
            tx.send(ProgressMessage::Finished { phase: ProgressPhase::Extracting }).ok();
        }
        Ok(pairs)
    }

    /// Read one file and split it into sentences
    pub fn extract_file(&self, path: &Path) -> Result<Vec<String>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        if ext == "pdf" {
            let text = read_pdf(path)?;
            if text.trim().is_empty() {
                tracing::warn!("No text content found in PDF file {}", path.display());
                return Ok(vec![]);
            }
            return Ok(self.sentences(&text));
        }

        let content = read_text(path)?;
        let text = match ext.as_str() {
            "csv" => {
                if !content.contains(',') && !content.contains(';') {
                    tracing::warn!("{} doesn't appear to be valid CSV", path.display());
                    return Ok(vec![]);
                }
                content
            }
            "xml" | "html" | "htm" => {
                if !content.trim_start().starts_with('<') {
                    tracing::warn!("{} doesn't appear to be valid markup", path.display());
                    return Ok(vec![]);
                }
                strip_markup(&content)
            }
            _ => content,
        };

        Ok(self.sentences(&text))
    }

    /// Normalize whitespace, split into sentences and drop short ones
    pub fn sentences(&self, text: &str) -> Vec<String> {
        let cleaned = whitespace_re().replace_all(text, " ");
        split_sentences(cleaned.trim())
            .into_iter()
            .map(str::trim)
            .filter(|s| s.chars().count() > self.min_sentence_length)
            .map(str::to_string)
            .collect()
    }
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

fn markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("valid markup regex"))
}

/// Decode as UTF-8, falling back to Latin-1 (every byte maps to one char)
fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::debug!("{} is not UTF-8, decoding as Latin-1", path.display());
            Ok(e.into_bytes().into_iter().map(char::from).collect())
        }
    }
}

fn read_pdf(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let unreadable = |reason: String| Error::UnreadableDocument {
        path: path.display().to_string(),
        reason,
    };

    // pdf-extract panics on some malformed inputs
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(unreadable(e.to_string())),
        Err(_) => Err(unreadable("PDF parser panicked".to_string())),
    }
}

fn strip_markup(content: &str) -> String {
    markup_re()
        .replace_all(content, " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Split after `.`, `!` or `?` when followed by whitespace
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(next_idx, next)) = chars.peek() {
            if next.is_whitespace() {
                sentences.push(&text[start..next_idx]);
                start = next_idx;
            }
        } else {
            sentences.push(&text[start..idx + c.len_utf8()]);
            start = text.len();
        }
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}
