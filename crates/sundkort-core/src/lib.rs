//! Core library for Danish health card field extraction.
//!
//! This crate provides:
//! - Line sources (plain OCR text, embedded PDF text)
//! - A field mapper turning unlabelled card lines into a typed record
//! - CPR decoding (birth date, age, gender)
//! - Configurable token tables for line classification

pub mod card;
pub mod error;
pub mod models;
pub mod source;

pub use card::rules::{decode_cpr, CprDetails, Gender, LineClassifier};
pub use card::{CardExtractor, CardMetadata, ExtractionResult, HealthCardMapper, IssuerKind};
pub use error::{CprError, ExtractionError, PdfError, Result, SundkortError};
pub use models::config::{LexiconConfig, SundkortConfig};
pub use models::record::FieldRecord;
pub use source::{CardLines, LineSource, PdfSource, SourceKind, TextSource};
