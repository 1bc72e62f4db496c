//! Phone number extraction.

use super::classify::Lexicon;
use super::patterns::{CPR_PATTERN, PHONE_GROUPS};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::config::LexiconConfig;

const LABELED_CONFIDENCE: f32 = 0.95;
const PATTERN_CONFIDENCE: f32 = 0.7;

/// Phone field extractor.
///
/// A line qualifies when it carries a phone label ("Tlf.", "Mobil:", ...) or
/// an unlabelled `DD DD DD DD` group. Labels are stripped from the value and
/// the remainder must still contain the digit groups.
#[derive(Debug, Clone)]
pub struct PhoneExtractor {
    labels: Vec<String>,
    exclusions: Lexicon,
}

impl PhoneExtractor {
    pub fn new(config: &LexiconConfig) -> Self {
        Self {
            labels: config
                .phone_labels
                .iter()
                .filter(|l| !l.is_empty())
                .cloned()
                .collect(),
            exclusions: Lexicon::new(&config.phone_exclusions),
        }
    }

    fn is_labeled(&self, line: &str) -> bool {
        self.labels.iter().any(|label| line.contains(label.as_str()))
    }

    fn strip_labels(&self, line: &str) -> String {
        self.labels
            .iter()
            .fold(line.to_string(), |acc, label| acc.replace(label.as_str(), ""))
            .trim()
            .to_string()
    }
}

impl Default for PhoneExtractor {
    fn default() -> Self {
        Self::new(&LexiconConfig::default())
    }
}

impl FieldExtractor for PhoneExtractor {
    type Output = String;

    fn extract(&self, line: &str) -> Option<ExtractionMatch<String>> {
        let labeled = self.is_labeled(line);

        if !labeled {
            if !PHONE_GROUPS.is_match(line) {
                return None;
            }
            // Unlabelled digit groups next to a registration abbreviation are
            // some other number.
            if self.exclusions.matches(line) || CPR_PATTERN.is_match(line) {
                return None;
            }
        }

        let value = self.strip_labels(line);
        if !PHONE_GROUPS.is_match(&value) {
            return None;
        }

        let confidence = if labeled {
            LABELED_CONFIDENCE
        } else {
            PATTERN_CONFIDENCE
        };
        Some(ExtractionMatch::new(value, confidence, line))
    }

    /// Labelled numbers win over bare digit groups; within each class the
    /// earliest line wins.
    fn find(&self, lines: &[String]) -> Option<ExtractionMatch<String>> {
        let matches = self.find_all(lines);
        let labeled = matches
            .iter()
            .position(|m| m.confidence >= LABELED_CONFIDENCE);

        match labeled {
            Some(index) => matches.into_iter().nth(index),
            None => matches.into_iter().next(),
        }
    }
}
