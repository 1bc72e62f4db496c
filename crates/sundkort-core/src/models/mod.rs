//! Data models and configuration.

pub mod config;
pub mod record;

pub use config::{LexiconConfig, OutputConfig, PdfConfig, SundkortConfig};
pub use record::FieldRecord;
