//! Rule-based field extractors for Danish health cards.

pub mod classify;
pub mod cpr;
pub mod patterns;
pub mod phone;
pub mod split;

pub use classify::{Lexicon, LineClassifier};
pub use cpr::{
    decode_cpr, extract_cpr, format_cpr, resolve_century, CprDetails, CprExtractor, Gender,
};
pub use patterns::*;
pub use phone::PhoneExtractor;
pub use split::{split_name, split_postal_city, NameParts, PostalParts};

/// Trait for line-oriented field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from a single line.
    fn extract(&self, line: &str) -> Option<ExtractionMatch<Self::Output>>;

    /// Scan lines in reading order and return the first match.
    fn find(&self, lines: &[String]) -> Option<ExtractionMatch<Self::Output>> {
        lines
            .iter()
            .enumerate()
            .find_map(|(index, line)| self.extract(line).map(|m| m.with_line(index)))
    }

    /// Extract all matches, in reading order.
    fn find_all(&self, lines: &[String]) -> Vec<ExtractionMatch<Self::Output>> {
        lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| self.extract(line).map(|m| m.with_line(index)))
            .collect()
    }
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Index of the source line.
    pub line: Option<usize>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            line: None,
            source: source.into(),
        }
    }

    pub fn with_line(mut self, index: usize) -> Self {
        self.line = Some(index);
        self
    }
}
