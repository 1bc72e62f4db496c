//! Splitting of composite fields.

use super::patterns::POSTAL_CITY_SPLIT;

/// A full name split into given names and surname.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
    pub first_name: String,
    pub surname: String,
}

/// Split a full name on whitespace; the last word is the surname.
///
/// A single word becomes the first name only.
pub fn split_name(full_name: &str) -> NameParts {
    let words: Vec<&str> = full_name.split_whitespace().collect();

    match words.split_last() {
        None => NameParts::default(),
        Some((only, [])) => NameParts {
            first_name: only.to_string(),
            surname: String::new(),
        },
        Some((last, rest)) => NameParts {
            first_name: rest.join(" "),
            surname: last.to_string(),
        },
    }
}

/// A postal line split into code and city.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalParts {
    pub postal_code: String,
    pub city: String,
}

/// Split "2300 København S" into "2300" and "København S".
pub fn split_postal_city(line: &str) -> Option<PostalParts> {
    let caps = POSTAL_CITY_SPLIT.captures(line.trim())?;
    Some(PostalParts {
        postal_code: caps[1].to_string(),
        city: caps[2].trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name("Anna Maria Jensen"),
            NameParts {
                first_name: "Anna Maria".to_string(),
                surname: "Jensen".to_string(),
            }
        );
        assert_eq!(
            split_name("Madonna"),
            NameParts {
                first_name: "Madonna".to_string(),
                surname: String::new(),
            }
        );
        assert_eq!(split_name("   "), NameParts::default());
        assert_eq!(split_name("HANS  HANSEN").first_name, "HANS");
    }

    #[test]
    fn test_split_postal_city() {
        assert_eq!(
            split_postal_city("2300 København S"),
            Some(PostalParts {
                postal_code: "2300".to_string(),
                city: "København S".to_string(),
            })
        );
        assert_eq!(split_postal_city("8000  Aarhus C ").unwrap().city, "Aarhus C");
        assert_eq!(split_postal_city("København 2300"), None);
        assert_eq!(split_postal_city(""), None);
    }
}
