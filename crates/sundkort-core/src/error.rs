//! Error types for the sundkort-core library.

use thiserror::Error;

/// Main error type for the sundkort library.
#[derive(Error, Debug)]
pub enum SundkortError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The PDF carries too little embedded text; it needs OCR instead.
    #[error("PDF has no usable embedded text ({0} characters)")]
    NoText(usize),
}

/// Errors raised when the caller hands the mapper malformed input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A line in the input sequence is empty or whitespace-only.
    #[error("line {index} is blank")]
    BlankLine { index: usize },
}

/// Errors from decoding a CPR number into birth date and gender.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CprError {
    /// The code does not contain exactly ten digits.
    #[error("expected 10 digits, found {0}")]
    DigitCount(usize),

    /// Month outside 1..=12.
    #[error("invalid month: {0}")]
    InvalidMonth(u32),

    /// Day does not exist in the given month and year.
    #[error("invalid day {day} for {month:02}/{year}")]
    InvalidDay { day: u32, month: u32, year: i32 },
}

/// Result type for the sundkort library.
pub type Result<T> = std::result::Result<T, SundkortError>;
