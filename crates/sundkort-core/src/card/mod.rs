//! Health card field extraction.

mod mapper;
pub mod rules;

pub use mapper::{CardMetadata, ExtractionResult, HealthCardMapper, IssuerKind};

use crate::error::Result;
use crate::models::record::FieldRecord;
use crate::source::LineSource;

/// Trait for health card field extractors.
pub trait CardExtractor {
    /// Extract card data from a line source.
    fn extract(&self, source: &dyn LineSource) -> Result<ExtractionResult>;

    /// Extract card data from plain OCR text.
    fn extract_from_text(&self, text: &str) -> Result<FieldRecord>;
}
