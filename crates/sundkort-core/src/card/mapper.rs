//! Field mapper turning card lines into a [`FieldRecord`].
//!
//! Three stages run over the same line sequence:
//!
//! 1. a global pattern scan for fields recognisable on their own (CPR,
//!    region, municipality, validity date, postal line, phone);
//! 2. a positional scan around the CPR line: the holder is searched below
//!    it, the clinic or doctor above it;
//! 3. derived fields: birth date, age and gender decoded from the CPR
//!    number, and the name and postal line split into parts.
//!
//! Each search is greedy: the first match in scan direction wins and is
//! never overwritten.

use std::time::Instant;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::rules::{
    decode_cpr, split_name, split_postal_city, CprExtractor, FieldExtractor, LineClassifier,
    PhoneExtractor, DATE_DMY,
};
use super::CardExtractor;
use crate::error::Result;
use crate::models::config::{LexiconConfig, SundkortConfig};
use crate::models::record::FieldRecord;
use crate::source::{CardLines, LineSource, SourceKind};

/// Which branch of the issuer search produced `doctor_name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuerKind {
    /// A clinic line (contains a clinic token).
    Clinic,
    /// A person name above the CPR line.
    Doctor,
    /// No issuer found.
    #[default]
    Unknown,
}

/// Information about how a record was extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardMetadata {
    /// Card type line, or the configured default.
    pub card_type: String,
    /// How the issuer was identified.
    pub issuer_kind: IssuerKind,
    /// Where the lines came from.
    pub source_kind: SourceKind,
    /// Index of the CPR line, if any.
    pub anchor_line: Option<usize>,
    /// Number of lines mapped.
    pub line_count: usize,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Result of card extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub record: FieldRecord,
    /// Extraction metadata.
    pub metadata: CardMetadata,
    /// Lines the record was extracted from, joined with newlines.
    pub raw_text: String,
}

/// Record under construction, owned by a single mapping call.
#[derive(Debug, Default)]
struct Draft {
    record: FieldRecord,
    anchor: Option<usize>,
    issuer: IssuerKind,
}

/// Maps OCR lines of a Danish health card to structured fields.
///
/// The mapper holds only immutable configuration and can be shared between
/// threads.
#[derive(Debug, Clone)]
pub struct HealthCardMapper {
    classifier: LineClassifier,
    phone: PhoneExtractor,
    cpr: CprExtractor,
    default_card_type: String,
    /// Day ages are computed against; `None` means the local date.
    reference_date: Option<NaiveDate>,
}

impl HealthCardMapper {
    /// Create a mapper with the built-in Danish vocabulary.
    pub fn new() -> Self {
        Self::with_lexicon(&LexiconConfig::default())
    }

    /// Create a mapper with custom token tables.
    pub fn with_lexicon(lexicon: &LexiconConfig) -> Self {
        Self {
            classifier: LineClassifier::new(lexicon),
            phone: PhoneExtractor::new(lexicon),
            cpr: CprExtractor::new(),
            default_card_type: lexicon.default_card_type.clone(),
            reference_date: None,
        }
    }

    pub fn from_config(config: &SundkortConfig) -> Self {
        Self::with_lexicon(&config.lexicon)
    }

    /// Compute ages relative to a fixed day.
    pub fn with_reference_date(mut self, today: NaiveDate) -> Self {
        self.reference_date = Some(today);
        self
    }

    /// Map a line sequence to a record.
    pub fn map(&self, lines: &CardLines) -> FieldRecord {
        self.run(lines).record
    }

    /// Validate raw lines and map them.
    ///
    /// Fails only when a line is blank.
    pub fn map_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<FieldRecord> {
        let lines = CardLines::new(lines)?;
        Ok(self.map(&lines))
    }

    /// Map a line sequence and collect extraction metadata.
    pub fn analyze(&self, lines: &CardLines, source_kind: SourceKind) -> ExtractionResult {
        let start = Instant::now();
        let draft = self.run(lines);

        let mut warnings = Vec::new();
        for (field, value) in [
            ("national_id", &draft.record.national_id),
            ("holder_name", &draft.record.holder_name),
            ("doctor_name", &draft.record.doctor_name),
        ] {
            if value.is_empty() {
                warnings.push(format!("Could not extract {}", field));
            }
        }

        let card_type = lines
            .iter()
            .find(|l| self.classifier.is_card_type(l))
            .map(str::to_string)
            .unwrap_or_else(|| self.default_card_type.clone());

        debug!(
            "Extracted {} of {} fields from {} lines",
            draft.record.filled_count(),
            FieldRecord::FIELD_NAMES.len(),
            lines.len()
        );

        ExtractionResult {
            metadata: CardMetadata {
                card_type,
                issuer_kind: draft.issuer,
                source_kind,
                anchor_line: draft.anchor,
                line_count: lines.len(),
                warnings,
                processing_time_ms: start.elapsed().as_millis() as u64,
            },
            raw_text: lines.text(),
            record: draft.record,
        }
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    fn run(&self, lines: &CardLines) -> Draft {
        info!("Mapping health card from {} lines", lines.len());

        let lines = lines.as_slice();
        let draft = self.scan_patterns(lines, Draft::default());
        let draft = self.scan_positions(lines, draft);
        self.derive_fields(draft)
    }

    // ------------------------------------------------------------------
    // Stage 1: global pattern scan
    // ------------------------------------------------------------------

    fn scan_patterns(&self, lines: &[String], mut draft: Draft) -> Draft {
        let record = &mut draft.record;

        if let Some(cpr) = self.cpr.find(lines) {
            debug!("CPR matched in {:?}", cpr.source);
            record.national_id = cpr.value;
            draft.anchor = cpr.line;
        }

        record.region = first_line(lines, |l| self.classifier.is_region(l));
        record.municipality = first_line(lines, |l| self.classifier.is_municipality(l));
        record.valid_from = first_line(lines, |l| DATE_DMY.is_match(l));
        record.holder_postal_city = first_line(lines, |l| self.classifier.is_postal_city(l));

        if let Some(phone) = self.phone.find(lines) {
            trace!(
                "phone matched in {:?} (confidence {:.2})",
                phone.source, phone.confidence
            );
            record.doctor_phone = phone.value;
        }

        debug!("CPR anchor line: {:?}", draft.anchor);
        draft
    }

    // ------------------------------------------------------------------
    // Stage 2: positional scan around the CPR line
    // ------------------------------------------------------------------

    fn scan_positions(&self, lines: &[String], mut draft: Draft) -> Draft {
        if let Some(anchor) = draft.anchor {
            self.find_holder(lines, anchor, &mut draft.record);
            draft.issuer = self.find_issuer(lines, anchor, &mut draft.record);
        }

        if draft.record.holder_name.is_empty() {
            self.find_any_person(lines, &mut draft.record);
        }

        draft
    }

    /// Holder: first person name below the CPR line.
    fn find_holder(&self, lines: &[String], anchor: usize, record: &mut FieldRecord) {
        for (index, line) in lines.iter().enumerate().skip(anchor + 1) {
            trace!("holder search line {}: {:?}", index, self.classifier.classify(line));

            if self.classifier.is_header(line) || self.classifier.is_date(line) {
                continue;
            }
            if !self.classifier.is_person_name(line) {
                continue;
            }

            record.holder_name = line.clone();
            debug!("Holder found at line {}", index);

            if let Some(address) = self.address_at(lines, index + 1) {
                record.holder_address = address;

                if let Some(postal) = lines
                    .get(index + 2)
                    .filter(|l| self.classifier.is_postal_city(l))
                {
                    record.holder_postal_city = postal.clone();
                }
            }
            return;
        }
    }

    /// Issuer: nearest clinic or person name above the CPR line.
    fn find_issuer(&self, lines: &[String], anchor: usize, record: &mut FieldRecord) -> IssuerKind {
        for index in (0..anchor).rev() {
            let line = &lines[index];
            trace!("issuer search line {}: {:?}", index, self.classifier.classify(line));

            if self.classifier.is_header(line) {
                continue;
            }

            let kind = if self.classifier.is_clinic_name(line) {
                IssuerKind::Clinic
            } else if self.classifier.is_person_name(line) {
                IssuerKind::Doctor
            } else {
                continue;
            };

            record.doctor_name = line.clone();
            if let Some(address) = self.address_at(lines, index + 1) {
                record.doctor_address = address;
            }
            debug!("Issuer ({:?}) found at line {}", kind, index);
            return kind;
        }

        IssuerKind::Unknown
    }

    /// Fallback holder: first person name anywhere that is not a clinic.
    fn find_any_person(&self, lines: &[String], record: &mut FieldRecord) {
        let found = lines.iter().position(|l| {
            self.classifier.is_person_name(l) && !self.classifier.is_clinic_name(l)
        });

        if let Some(index) = found {
            record.holder_name = lines[index].clone();
            if let Some(address) = self.address_at(lines, index + 1) {
                record.holder_address = address;
            }
            debug!("Holder found by fallback at line {}", index);
        }
    }

    fn address_at(&self, lines: &[String], index: usize) -> Option<String> {
        lines
            .get(index)
            .filter(|l| self.classifier.is_address(l))
            .cloned()
    }

    // ------------------------------------------------------------------
    // Stage 3: derived fields
    // ------------------------------------------------------------------

    fn derive_fields(&self, mut draft: Draft) -> Draft {
        let record = &mut draft.record;

        if !record.national_id.is_empty() {
            match decode_cpr(&record.national_id) {
                Ok(details) => {
                    record.date_of_birth = details.date_of_birth();
                    record.age = details.age_on(self.today()).to_string();
                    record.gender = details.gender.to_string();
                }
                Err(e) => debug!("Could not decode CPR {:?}: {}", record.national_id, e),
            }
        }

        let name = split_name(&record.holder_name);
        record.holder_first_name = name.first_name;
        record.holder_surname = name.surname;

        if let Some(postal) = split_postal_city(&record.holder_postal_city) {
            record.postal_code = postal.postal_code;
            record.city = postal.city;
        }

        draft
    }
}

impl Default for HealthCardMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl CardExtractor for HealthCardMapper {
    fn extract(&self, source: &dyn LineSource) -> Result<ExtractionResult> {
        let lines = source.lines()?;
        Ok(self.analyze(&lines, source.kind()))
    }

    fn extract_from_text(&self, text: &str) -> Result<FieldRecord> {
        Ok(self.map(&CardLines::from_text(text)))
    }
}

fn first_line(lines: &[String], predicate: impl Fn(&str) -> bool) -> String {
    lines
        .iter()
        .find(|l| predicate(l))
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn mapper() -> HealthCardMapper {
        HealthCardMapper::new().with_reference_date(today())
    }

    fn lines(items: &[&str]) -> CardLines {
        CardLines::new(items).unwrap()
    }

    #[test]
    fn test_full_card() {
        let card = lines(&[
            "SUNDHEDSKORT",
            "REGION HOVEDSTADEN",
            "Lægehuset Vesterbro",
            "Istedgade 12",
            "Tlf. 33 21 45 67",
            "010190-1234 *",
            "Anna Maria Jensen",
            "Toftegårds Allé 5, 2. tv",
            "2500 Valby",
            "Københavns Kommune",
            "Gyldig fra 01.01.2020",
        ]);

        let record = mapper().map(&card);

        assert_eq!(
            record,
            FieldRecord {
                holder_first_name: "Anna Maria".to_string(),
                holder_surname: "Jensen".to_string(),
                holder_name: "Anna Maria Jensen".to_string(),
                holder_address: "Toftegårds Allé 5, 2. tv".to_string(),
                postal_code: "2500".to_string(),
                city: "Valby".to_string(),
                holder_postal_city: "2500 Valby".to_string(),
                national_id: "010190-1234".to_string(),
                doctor_name: "Lægehuset Vesterbro".to_string(),
                doctor_address: "Istedgade 12".to_string(),
                doctor_phone: "33 21 45 67".to_string(),
                municipality: "Københavns Kommune".to_string(),
                region: "REGION HOVEDSTADEN".to_string(),
                valid_from: "Gyldig fra 01.01.2020".to_string(),
                date_of_birth: "01.01.1990".to_string(),
                age: "34".to_string(),
                gender: "Female".to_string(),
            }
        );
    }

    #[test]
    fn test_holder_below_and_issuer_above_anchor() {
        let card = lines(&[
            "City Medical Center",
            "Nørregade 7",
            "150875-4321",
            "PETER HANSEN",
            "Søndervej 3",
            "2300 København S",
        ]);

        let result = mapper().analyze(&card, SourceKind::Text);
        let record = &result.record;

        assert_eq!(record.doctor_name, "City Medical Center");
        assert_eq!(record.doctor_address, "Nørregade 7");
        assert_eq!(record.holder_name, "PETER HANSEN");
        assert_eq!(record.holder_address, "Søndervej 3");
        assert_eq!(record.holder_postal_city, "2300 København S");
        assert_eq!(record.postal_code, "2300");
        assert_eq!(record.city, "København S");
        assert_eq!(record.gender, "Male");
        assert_eq!(result.metadata.issuer_kind, IssuerKind::Clinic);
        assert_eq!(result.metadata.anchor_line, Some(2));
    }

    #[test]
    fn test_doctor_person_name_when_no_clinic() {
        let card = lines(&["Læge", "Jens Olsen", "Bredgade 1", "010190-1234", "Mette Holm"]);
        // "Læge" is a clinic token but Jens Olsen is nearer the anchor
        let result = mapper().analyze(&card, SourceKind::Text);

        assert_eq!(result.record.doctor_name, "Jens Olsen");
        assert_eq!(result.record.doctor_address, "Bredgade 1");
        assert_eq!(result.metadata.issuer_kind, IssuerKind::Doctor);
        assert_eq!(result.record.holder_name, "Mette Holm");
    }

    #[test]
    fn test_clinic_wins_over_person_on_same_line() {
        let card = lines(&["Lægerne Jensen Og Holm", "010190-1234"]);
        let result = mapper().analyze(&card, SourceKind::Text);

        assert_eq!(result.record.doctor_name, "Lægerne Jensen Og Holm");
        assert_eq!(result.metadata.issuer_kind, IssuerKind::Clinic);
    }

    #[test]
    fn test_holder_search_skips_headers_and_dates() {
        let card = lines(&[
            "010190-1234",
            "REGION SJÆLLAND",
            "Gyldig fra",
            "01.03.2021",
            "Karen Blixen",
        ]);
        let record = mapper().map(&card);

        assert_eq!(record.holder_name, "Karen Blixen");
        assert_eq!(record.holder_first_name, "Karen");
        assert_eq!(record.holder_surname, "Blixen");
    }

    #[test]
    fn test_postal_line_only_taken_after_address() {
        let card = lines(&["010190-1234", "Karen Blixen", "5000 Odense C", "Rungstedvej 111"]);
        let record = mapper().map(&card);

        assert_eq!(record.holder_address, "");
        // still found by the global scan
        assert_eq!(record.holder_postal_city, "5000 Odense C");
        assert_eq!(record.postal_code, "5000");
    }

    #[test]
    fn test_postal_line_after_address_overwrites_global_match() {
        let card = lines(&[
            "1000 Kbh K",
            "010190-1234",
            "Karen Blixen",
            "Rungstedvej 111",
            "2960 Rungsted Kyst",
        ]);
        let record = mapper().map(&card);

        assert_eq!(record.holder_postal_city, "2960 Rungsted Kyst");
        assert_eq!(record.city, "Rungsted Kyst");
    }

    #[test]
    fn test_region_from_bare_region_name() {
        let record = mapper().map(&lines(&["Hovedstaden", "010190-1234"]));
        assert_eq!(record.region, "Hovedstaden");
    }

    #[test]
    fn test_region_skips_clinic_line() {
        let card = lines(&["Lægehuset Midtjylland", "010190-1234", "Region Midtjylland"]);
        let record = mapper().map(&card);

        assert_eq!(record.region, "Region Midtjylland");
        assert_eq!(record.doctor_name, "Lægehuset Midtjylland");
    }

    #[test]
    fn test_doubled_space_is_not_a_holder_name() {
        let record = mapper().map(&lines(&["010190-1234", "Anna  Jensen", "Mette Holm"]));
        assert_eq!(record.holder_name, "Mette Holm");
    }

    #[test]
    fn test_fallback_holder_without_anchor() {
        let card = lines(&["SUNDHEDSKORT", "Lars Nielsen", "Havnegade 4", "9000 Aalborg"]);
        let record = mapper().map(&card);

        assert_eq!(record.holder_name, "Lars Nielsen");
        assert_eq!(record.holder_address, "Havnegade 4");
        assert_eq!(record.national_id, "");
        assert_eq!(record.date_of_birth, "");
        assert_eq!(record.age, "");
        assert_eq!(record.gender, "");
    }

    #[test]
    fn test_fallback_when_nothing_below_anchor() {
        let card = lines(&["Lars Nielsen", "010190-1234"]);
        let result = mapper().analyze(&card, SourceKind::Text);

        // issuer search and fallback both see the same line
        assert_eq!(result.record.doctor_name, "Lars Nielsen");
        assert_eq!(result.record.holder_name, "Lars Nielsen");
    }

    #[test]
    fn test_malformed_cpr_leaves_derived_fields_empty() {
        let record = mapper().map(&lines(&["310490-1234", "Anna Jensen"]));
        assert_eq!(record.national_id, "310490-1234");
        assert_eq!(record.holder_name, "Anna Jensen");
        assert_eq!(record.date_of_birth, "");
        assert_eq!(record.age, "");
        assert_eq!(record.gender, "");
    }

    #[test]
    fn test_extra_digits_in_cpr_line_fail_decode() {
        let record = mapper().map(&lines(&["CPR 2 010190-1234"]));
        assert_eq!(record.national_id, "CPR 2 010190-1234");
        assert_eq!(record.date_of_birth, "");
    }

    #[test]
    fn test_empty_input() {
        let record = mapper().map(&CardLines::default());
        assert_eq!(record, FieldRecord::default());
    }

    #[test]
    fn test_map_lines_rejects_blank_line() {
        let err = mapper().map_lines(&["010190-1234", ""]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::SundkortError::Extraction(crate::error::ExtractionError::BlankLine {
                index: 1
            })
        ));
    }

    #[test]
    fn test_metadata() {
        let card = lines(&["Rejsesygesikringskort", "010190-1234"]);
        let result = mapper().analyze(&card, SourceKind::Pdf);

        assert_eq!(result.metadata.card_type, "Rejsesygesikringskort");
        assert_eq!(result.metadata.source_kind, SourceKind::Pdf);
        assert_eq!(result.metadata.line_count, 2);
        assert_eq!(
            result.metadata.warnings,
            vec![
                "Could not extract holder_name".to_string(),
                "Could not extract doctor_name".to_string(),
            ]
        );
        assert_eq!(result.raw_text, "Rejsesygesikringskort\n010190-1234");

        let result = mapper().analyze(&lines(&["x y"]), SourceKind::Text);
        assert_eq!(result.metadata.card_type, "Danish Health Card");
        assert_eq!(result.metadata.issuer_kind, IssuerKind::Unknown);
    }

    #[test]
    fn test_mapper_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HealthCardMapper>();
    }
}
