//! The structured record produced for one health card.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fields extracted from a Danish health card.
///
/// Every field is always present; fields that could not be located hold an
/// empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRecord {
    /// Given names of the card holder.
    pub holder_first_name: String,
    /// Surname of the card holder.
    pub holder_surname: String,
    /// Full name line of the card holder.
    pub holder_name: String,
    /// Street line of the card holder.
    pub holder_address: String,
    /// Postal code split out of `holder_postal_city`.
    pub postal_code: String,
    /// City split out of `holder_postal_city`.
    pub city: String,
    /// Postal code and city line, e.g. "2300 København S".
    pub holder_postal_city: String,
    /// CPR number as printed (DDMMYY-SSSS).
    pub national_id: String,
    /// Clinic or general practitioner name.
    pub doctor_name: String,
    /// Clinic or general practitioner street line.
    pub doctor_address: String,
    /// Clinic or general practitioner phone number.
    pub doctor_phone: String,
    pub municipality: String,
    pub region: String,
    pub valid_from: String,
    /// Birth date decoded from the CPR number (DD.MM.YYYY).
    pub date_of_birth: String,
    /// Age in whole years decoded from the CPR number.
    pub age: String,
    /// "Male" or "Female", decoded from the CPR number.
    pub gender: String,
}

impl FieldRecord {
    /// Field names in output order.
    pub const FIELD_NAMES: [&'static str; 17] = [
        "holder_first_name",
        "holder_surname",
        "holder_name",
        "holder_address",
        "postal_code",
        "city",
        "holder_postal_city",
        "national_id",
        "doctor_name",
        "doctor_address",
        "doctor_phone",
        "municipality",
        "region",
        "valid_from",
        "date_of_birth",
        "age",
        "gender",
    ];

    /// All fields as (name, value) pairs in output order.
    pub fn fields(&self) -> [(&'static str, &str); 17] {
        [
            ("holder_first_name", self.holder_first_name.as_str()),
            ("holder_surname", self.holder_surname.as_str()),
            ("holder_name", self.holder_name.as_str()),
            ("holder_address", self.holder_address.as_str()),
            ("postal_code", self.postal_code.as_str()),
            ("city", self.city.as_str()),
            ("holder_postal_city", self.holder_postal_city.as_str()),
            ("national_id", self.national_id.as_str()),
            ("doctor_name", self.doctor_name.as_str()),
            ("doctor_address", self.doctor_address.as_str()),
            ("doctor_phone", self.doctor_phone.as_str()),
            ("municipality", self.municipality.as_str()),
            ("region", self.region.as_str()),
            ("valid_from", self.valid_from.as_str()),
            ("date_of_birth", self.date_of_birth.as_str()),
            ("age", self.age.as_str()),
            ("gender", self.gender.as_str()),
        ]
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields()
            .into_iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Owned name-to-value map with every key present.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.fields()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    /// Number of non-empty fields.
    pub fn filled_count(&self) -> usize {
        self.fields().iter().filter(|(_, value)| !value.is_empty()).count()
    }
}
