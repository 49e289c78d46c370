use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MappingError(String);

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for MappingError {}

/// Maps the headers found in the first row of a sheet to their column positions. Each header also
/// gets a logical field name by converting it to snake_case, e.g. `VAT` -> `vat`.
///
/// Blank header cells are allowed (they keep their position) but cannot be looked up.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Mapping {
    header_map: HashMap<Header, usize>,
    field_map: HashMap<Field, usize>,
}

impl Mapping {
    /// Create a new `Mapping` from a header row.
    ///
    /// # Errors
    /// - Returns an error if two non-blank headers are equal or convert to the same field name.
    pub fn new<S, I>(headers: I) -> Result<Self, MappingError>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let headers: Vec<Header> = headers.into_iter().map(|s| s.into().into()).collect();
        let fields: Vec<Field> = headers.iter().map(|h| Field(to_snake_case(h))).collect();

        let mut header_map = HashMap::new();
        let mut field_map = HashMap::new();
        for (idx, (header, field)) in headers.iter().zip(fields.iter()).enumerate() {
            if header.is_blank() {
                continue;
            }
            if header_map.insert(header.clone(), idx).is_some() {
                return Err(MappingError(format!(
                    "Encountered a duplicate header '{}'",
                    header.as_ref()
                )));
            }
            if field_map.insert(field.clone(), idx).is_some() {
                return Err(MappingError(format!(
                    "Encountered a duplicate field name '{}' \
                    (two or more headers resulted in the same snake_case conversion)",
                    field.as_ref()
                )));
            }
        }

        Ok(Self {
            header_map,
            field_map,
        })
    }

    pub fn header_index(&self, header: impl Into<Header>) -> Option<usize> {
        let h = header.into();
        self.header_map.get(&h).cloned()
    }

    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.field_map.get(&Field(field.to_string())).cloned()
    }
}

/// Represents a header in a sheet, for example, `VAT`
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Header(String);

impl Header {
    fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl AsRef<str> for Header {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl<S: Into<String>> From<S> for Header {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

/// Represents the logical name of a column, for example, `vat`
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Field(String);

impl AsRef<str> for Field {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

pub(crate) fn to_snake_case(s: impl AsRef<str>) -> String {
    let s = s.as_ref().trim();
    if s.is_empty() {
        return "no_name".to_string();
    }
    let lower = s.to_lowercase().replace(' ', "_").replace('#', "number");
    let alphanumeric: String = lower
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || c == '_')
        .collect();
    let first_char = lower.chars().next().unwrap_or('a');
    if !first_char.is_ascii_alphabetic() {
        format!("x_{alphanumeric}")
    } else {
        alphanumeric
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_snake_case_01() {
        assert_eq!(to_snake_case("VAT"), "vat");
        assert_eq!(to_snake_case("Reference #"), "reference_number");
    }

    #[test]
    fn test_to_snake_case_02() {
        assert_eq!(to_snake_case("123"), "x_123");
        assert_eq!(to_snake_case("  "), "no_name");
    }

    #[test]
    fn test_mapping_indexes() {
        let mapping = Mapping::new(["Name", "Date", "", "VAT"]).unwrap();
        assert_eq!(mapping.header_index("VAT"), Some(3));
        assert_eq!(mapping.field_index("vat"), Some(3));
        assert_eq!(mapping.header_index(""), None);
        assert_eq!(mapping.header_index("Total"), None);
        assert_eq!(mapping.field_index("no_name"), None);
    }

    #[test]
    fn test_mapping_allows_many_blanks() {
        let mapping = Mapping::new(["Name", "", "", "Date"]).unwrap();
        assert_eq!(mapping.header_index("Date"), Some(3));
    }

    #[test]
    fn test_mapping_duplicate_header() {
        assert!(Mapping::new(["Name", "Date", "Name"]).is_err());
    }

    #[test]
    fn test_mapping_duplicate_field() {
        let err = Mapping::new(["VAT", "Vat"]).unwrap_err();
        assert!(err.to_string().contains("duplicate field name"));
    }
}
