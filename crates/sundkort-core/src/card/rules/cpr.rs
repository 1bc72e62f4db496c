//! CPR (Danish personal identification number) extraction and decoding.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::patterns::CPR_PATTERN;
use super::{ExtractionMatch, FieldExtractor};
use crate::error::CprError;

/// CPR field extractor.
#[derive(Debug, Clone, Copy)]
pub struct CprExtractor;

impl CprExtractor {
    /// Create a new CPR extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Default for CprExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CprExtractor {
    type Output = String;

    fn extract(&self, line: &str) -> Option<ExtractionMatch<String>> {
        if !CPR_PATTERN.is_match(line) {
            return None;
        }

        // Cards print a "*" after the number; everything from it on is noise.
        let value = line.split('*').next().unwrap_or_default().trim();
        Some(ExtractionMatch::new(value.to_string(), 0.95, line))
    }
}

/// Extract the CPR value from a line, if the line carries one.
pub fn extract_cpr(line: &str) -> Option<String> {
    CprExtractor::new().extract(line).map(|m| m.value)
}

/// Gender encoded by the parity of the last CPR digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Odd digits are male, even digits female.
    pub fn from_digit(digit: u32) -> Self {
        if digit % 2 == 1 {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values derived from a valid CPR number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CprDetails {
    /// Birth date encoded in the first six digits.
    pub birth_date: NaiveDate,
    /// Gender encoded in the tenth digit.
    pub gender: Gender,
}

impl CprDetails {
    /// Age in whole years on the given day.
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        let mut age = today.year() - self.birth_date.year();
        if (today.month(), today.day()) < (self.birth_date.month(), self.birth_date.day()) {
            age -= 1;
        }
        age
    }

    /// Birth date as printed on Danish documents (DD.MM.YYYY).
    pub fn date_of_birth(&self) -> String {
        self.birth_date.format("%d.%m.%Y").to_string()
    }
}

/// Resolve a two-digit CPR year: 00-36 are 2000s, 37-99 are 1900s.
pub fn resolve_century(year: u32) -> i32 {
    let year = year as i32;
    if year <= 36 {
        2000 + year
    } else {
        1900 + year
    }
}

/// Decode a CPR number into birth date and gender.
///
/// Any non-digit characters are ignored; exactly ten digits must remain.
/// Day and month are validated against the resolved year, so 29 February
/// is only accepted in leap years.
pub fn decode_cpr(code: &str) -> Result<CprDetails, CprError> {
    let digits: Vec<u32> = code.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 10 {
        return Err(CprError::DigitCount(digits.len()));
    }

    let day = digits[0] * 10 + digits[1];
    let month = digits[2] * 10 + digits[3];
    let year = resolve_century(digits[4] * 10 + digits[5]);

    if !(1..=12).contains(&month) {
        return Err(CprError::InvalidMonth(month));
    }

    let birth_date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(CprError::InvalidDay { day, month, year })?;

    Ok(CprDetails {
        birth_date,
        gender: Gender::from_digit(digits[9]),
    })
}

/// Format a CPR number as DDMMYY-SSSS.
pub fn format_cpr(code: &str) -> String {
    let digits: String = code.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 10 {
        return code.to_string();
    }

    format!("{}-{}", &digits[0..6], &digits[6..10])
}
