//! Line sources feeding the field mapper.
//!
//! OCR providers and PDF extraction live outside this crate's core logic;
//! all of them must deliver the same shape: non-empty text lines in
//! top-to-bottom reading order.

mod pdf;

pub use pdf::PdfSource;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractionError, Result};

/// Where a line sequence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Plain text, one recognized line per text line.
    Text,
    /// Embedded text of a PDF.
    Pdf,
}

/// An ordered sequence of trimmed, non-empty card lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLines {
    lines: Vec<String>,
}

impl CardLines {
    /// Build from already-split lines, rejecting blank entries.
    pub fn new<I, S>(lines: I) -> std::result::Result<Self, ExtractionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| {
                let line = line.as_ref().trim();
                if line.is_empty() {
                    Err(ExtractionError::BlankLine { index })
                } else {
                    Ok(line.to_string())
                }
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { lines })
    }

    /// Split raw text into lines, dropping blank ones.
    pub fn from_text(text: &str) -> Self {
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Self { lines }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Lines joined with newlines.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Trait for collaborators that produce card lines.
pub trait LineSource {
    /// Produce the line sequence.
    fn lines(&self) -> Result<CardLines>;

    /// Kind of source, reported in extraction metadata.
    fn kind(&self) -> SourceKind;
}

/// Text dump from an OCR provider, one recognized line per text line.
#[derive(Debug, Clone)]
pub struct TextSource {
    text: String,
}

impl TextSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read a UTF-8 text file.
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }
}

impl LineSource for TextSource {
    fn lines(&self) -> Result<CardLines> {
        Ok(CardLines::from_text(&self.text))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Text
    }
}
