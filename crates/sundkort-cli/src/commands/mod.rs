//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod decode;
pub mod extract;

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use sundkort_core::{LineSource, PdfSource, SundkortConfig, TextSource};

/// File extensions read as plain OCR text.
pub const TEXT_EXTENSIONS: [&str; 3] = ["txt", "text", "ocr"];

/// Whether the path names a document `open_source` can read.
pub fn is_supported(path: &Path) -> bool {
    let extension = lowercase_extension(path);
    extension == "pdf" || TEXT_EXTENSIONS.contains(&extension.as_str())
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sundkort")
        .join("config.json")
}

/// Load the configuration named by `--config`, or the default file if it
/// exists, or the built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<SundkortConfig> {
    if let Some(path) = config_path {
        return Ok(SundkortConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(SundkortConfig::from_file(&default_path)?)
    } else {
        Ok(SundkortConfig::default())
    }
}

/// Open a document as a line source. `-` reads plain text from stdin.
pub fn open_source(path: &Path, config: &SundkortConfig) -> anyhow::Result<Box<dyn LineSource>> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(Box::new(TextSource::new(text)));
    }

    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let extension = lowercase_extension(path);
    match extension.as_str() {
        "pdf" => Ok(Box::new(PdfSource::from_file(path, config.pdf.clone())?)),
        ext if TEXT_EXTENSIONS.contains(&ext) => Ok(Box::new(TextSource::from_file(path)?)),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

/// Parse a `YYYY-MM-DD` reference date argument.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}
