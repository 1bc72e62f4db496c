//! Common regex patterns for Danish health card extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // CPR number (DDMMYY-SSSS)
    pub static ref CPR_PATTERN: Regex = Regex::new(
        r"\d{6}-\d{4}"
    ).unwrap();

    // Dates printed on the card (DD.MM.YYYY)
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\d{2}\.\d{2}\.\d{4}"
    ).unwrap();

    // Postal code line: 4 digits, whitespace, capitalised city
    pub static ref POSTAL_CITY: Regex = Regex::new(
        r"^\d{4}\s[A-ZÆØÅÄÖÜÉ]"
    ).unwrap();

    pub static ref POSTAL_CITY_SPLIT: Regex = Regex::new(
        r"^(\d{4})\s+(.+)$"
    ).unwrap();

    // Danish phone numbers are printed as four groups of two digits
    pub static ref PHONE_GROUPS: Regex = Regex::new(
        r"\d{2} \d{2} \d{2} \d{2}"
    ).unwrap();

    // House number after a comma ("Nørregade 12, 3. tv" or "Box 4, 2")
    pub static ref COMMA_NUMBER: Regex = Regex::new(
        r",\s*\d"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_city_accepts_danish_letters() {
        assert!(POSTAL_CITY.is_match("2300 København S"));
        assert!(POSTAL_CITY.is_match("8000 Århus C"));
        assert!(POSTAL_CITY.is_match("6700 Esbjerg"));
        assert!(!POSTAL_CITY.is_match("2300 københavn"));
        assert!(!POSTAL_CITY.is_match("Box 2300 Valby"));
    }

    #[test]
    fn test_cpr_pattern() {
        assert!(CPR_PATTERN.is_match("010190-1234"));
        assert!(CPR_PATTERN.is_match("CPR-nr. 010190-1234 *"));
        assert!(!CPR_PATTERN.is_match("0101901234"));
        assert!(!CPR_PATTERN.is_match("01019-1234"));
    }
}
