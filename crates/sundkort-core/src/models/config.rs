//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the sundkort pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SundkortConfig {
    /// Token tables used to classify lines.
    pub lexicon: LexiconConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Case-insensitive token tables driving line classification.
///
/// Every entry is matched as a substring, so adding a token here is enough
/// to teach the mapper new institutional or street vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// Institutional and label tokens that mark a line as card furniture.
    pub header_tokens: Vec<String>,

    /// Tokens identifying a clinic or medical practice.
    pub clinic_tokens: Vec<String>,

    /// Danish street-type suffixes.
    pub street_tokens: Vec<String>,

    /// Tokens identifying the region line.
    pub region_names: Vec<String>,

    /// Tokens identifying the municipality line.
    pub municipality_tokens: Vec<String>,

    /// "Valid from" labels in Danish and English.
    pub date_labels: Vec<String>,

    /// Labels printed in front of phone numbers. Matched case-sensitively.
    pub phone_labels: Vec<String>,

    /// Tokens that disqualify an unlabelled digit group from being a phone.
    pub phone_exclusions: Vec<String>,

    /// Tokens naming the card type.
    pub card_type_tokens: Vec<String>,

    /// Card type reported when no card-type token is found.
    pub default_card_type: String,
}

fn tokens(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            header_tokens: tokens(&[
                "REGION",
                "KOMMUNE",
                "SUNDHEDSKORT",
                "REJSESYGESIKRINGSKORT",
                "CERTIFICADO",
                "TOURIST",
                "HEALTH",
                "INSURANCE",
                "CARD",
                "GYLDIG FRA",
                "VALID FROM",
                "TELEFON",
                "TELEFAX",
                "INTERNET",
            ]),
            clinic_tokens: tokens(&[
                "LAEGEHUS",
                "LÆGEHUS",
                "LEGEHUS",
                "CLINIC",
                "MEDICAL",
                "CENTER",
                "HOSPITAL",
                "PRAKSIS",
                "DOCTOR",
                "LEGEN",
                "LÆGE",
            ]),
            street_tokens: tokens(&["gade", "vej", "allé", "plads"]),
            region_names: tokens(&[
                "Region",
                "Hovedstaden",
                "Sjælland",
                "Syddanmark",
                "Midtjylland",
                "Nordjylland",
            ]),
            municipality_tokens: tokens(&["Kommune"]),
            date_labels: tokens(&["Gyldig fra", "Valid from"]),
            phone_labels: tokens(&["Tlf.", "Tif.", "Tel.", "Mobil:"]),
            phone_exclusions: tokens(&["CVR", "SE-nr", "Ydernr"]),
            card_type_tokens: tokens(&["Sundhedskort", "Rejsesygesikring", "Health Card"]),
            default_card_type: "Danish Health Card".to_string(),
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,

    /// Minimum embedded text length to treat the PDF as text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 1,
            min_text_length: 20,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty_json: bool,
}

impl SundkortConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r#"{ "lexicon": { "street_tokens": ["gade", "stræde"] } }"#;
        let config: SundkortConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.lexicon.street_tokens, vec!["gade", "stræde"]);
        assert_eq!(config.lexicon.clinic_tokens, LexiconConfig::default().clinic_tokens);
        assert_eq!(config.pdf.max_pages, 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = SundkortConfig::default();
        config.output.pretty_json = true;
        config.lexicon.region_names.push("Færøerne".to_string());
        config.save(&path).unwrap();

        let loaded = SundkortConfig::from_file(&path).unwrap();
        assert!(loaded.output.pretty_json);
        assert_eq!(loaded.lexicon, config.lexicon);
    }
}
