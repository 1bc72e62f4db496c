//! Line classification predicates.
//!
//! Each predicate is a pure function of the line text and the configured
//! token tables. Exclusions are evaluated before positive matches, so an
//! institutional line is never accepted as a person.

use serde::{Deserialize, Serialize};

use super::patterns::{COMMA_NUMBER, CPR_PATTERN, DATE_DMY, POSTAL_CITY};
use crate::models::config::LexiconConfig;

/// A set of case-insensitive literal tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    tokens: Vec<String>,
}

impl Lexicon {
    /// Build a lexicon, lowercasing every token and dropping blank ones.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens }
    }

    /// Whether the line contains any token.
    pub fn matches(&self, line: &str) -> bool {
        self.find(line).is_some()
    }

    /// First token (in lexicon order) contained in the line.
    pub fn find(&self, line: &str) -> Option<&str> {
        let lower = line.to_lowercase();
        self.tokens
            .iter()
            .find(|t| lower.contains(t.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Coarse role of a line, in classification precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Cpr,
    Header,
    Date,
    ClinicName,
    Address,
    PostalCity,
    PersonName,
    Other,
}

/// Classifies card lines against the configured lexicons.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    header: Lexicon,
    clinic: Lexicon,
    street: Lexicon,
    region: Lexicon,
    municipality: Lexicon,
    date_labels: Lexicon,
    card_type: Lexicon,
}

impl LineClassifier {
    pub fn new(config: &LexiconConfig) -> Self {
        Self {
            header: Lexicon::new(&config.header_tokens),
            clinic: Lexicon::new(&config.clinic_tokens),
            street: Lexicon::new(&config.street_tokens),
            region: Lexicon::new(&config.region_names),
            municipality: Lexicon::new(&config.municipality_tokens),
            date_labels: Lexicon::new(&config.date_labels),
            card_type: Lexicon::new(&config.card_type_tokens),
        }
    }

    /// Institutional or label line (region, card type, "valid from", ...).
    pub fn is_header(&self, line: &str) -> bool {
        self.header.matches(line)
    }

    /// A DD.MM.YYYY date or a "valid from" label.
    pub fn is_date(&self, line: &str) -> bool {
        DATE_DMY.is_match(line) || self.date_labels.matches(line)
    }

    pub fn is_clinic_name(&self, line: &str) -> bool {
        self.clinic.matches(line)
    }

    /// Street line: a street-type token or a number after a comma, and
    /// neither a header, a date nor a CPR line.
    pub fn is_address(&self, line: &str) -> bool {
        (self.street.matches(line) || COMMA_NUMBER.is_match(line))
            && !self.is_header(line)
            && !self.is_date(line)
            && !CPR_PATTERN.is_match(line)
    }

    pub fn is_postal_city(&self, line: &str) -> bool {
        POSTAL_CITY.is_match(line)
    }

    /// Person name, either all upper-case ("HANS HANSEN") or with every
    /// word capitalised ("Anna Maria Jensen").
    pub fn is_person_name(&self, line: &str) -> bool {
        let line = line.trim();

        if line.chars().count() < 3 || line.chars().any(|c| c.is_ascii_digit()) {
            return false;
        }
        if !line.contains(' ') {
            return false;
        }
        if self.is_header(line) || self.is_clinic_name(line) || self.is_address(line) {
            return false;
        }

        is_upper_case(line) || is_capitalised_words(line)
    }

    /// Region name or the word "Region", unless the line names a clinic or
    /// a street ("Lægehuset Midtjylland", "Sjællandsgade 4").
    pub fn is_region(&self, line: &str) -> bool {
        self.region.matches(line) && !self.is_clinic_name(line) && !self.is_address(line)
    }

    pub fn is_municipality(&self, line: &str) -> bool {
        self.municipality.matches(line)
    }

    pub fn is_card_type(&self, line: &str) -> bool {
        self.card_type.matches(line)
    }

    /// Classify a line, resolving overlaps by precedence.
    pub fn classify(&self, line: &str) -> LineKind {
        if CPR_PATTERN.is_match(line) {
            LineKind::Cpr
        } else if self.is_header(line) {
            LineKind::Header
        } else if self.is_date(line) {
            LineKind::Date
        } else if self.is_clinic_name(line) {
            LineKind::ClinicName
        } else if self.is_address(line) {
            LineKind::Address
        } else if self.is_postal_city(line) {
            LineKind::PostalCity
        } else if self.is_person_name(line) {
            LineKind::PersonName
        } else {
            LineKind::Other
        }
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(&LexiconConfig::default())
    }
}

fn is_upper_case(line: &str) -> bool {
    line.chars().any(char::is_alphabetic) && line == line.to_uppercase()
}

/// Words are separated by single spaces; a doubled space leaves an empty
/// word and rejects the line.
fn is_capitalised_words(line: &str) -> bool {
    line.split(' ').all(|word| {
        let mut chars = word.chars();
        matches!(chars.next(), Some(first) if first.is_uppercase())
            && chars.any(char::is_alphabetic)
    })
}
