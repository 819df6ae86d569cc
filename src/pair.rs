//! One `name=value` segment of a form string.

use crate::codec;
use crate::descriptor::FieldTable;
use crate::DeserializeOptions;

/// A parsed wire pair.
///
/// The name is resolved against the field table: a segment whose raw name
/// is a field's wire name is reported under that field's native name.
///
/// # Examples
///
/// ```rust
/// use serde_form::{DeserializeOptions, FieldTable, WirePair};
///
/// let table = FieldTable::default();
/// let options = DeserializeOptions::default();
///
/// let pair = WirePair::parse("first+name=John+Smith", &table, &options);
/// assert_eq!(pair.name(), "first name");
/// assert_eq!(pair.value(), "John Smith");
///
/// let bare = WirePair::parse("Int", &table, &options);
/// assert_eq!(bare.raw_value(), None);
/// assert!(!bare.has_value());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WirePair<'a> {
    raw_name: &'a str,
    raw_value: Option<&'a str>,
    name: String,
    value: String,
}

impl<'a> WirePair<'a> {
    /// Splits `segment` on its first `=` and decodes both sides.
    pub fn parse(segment: &'a str, table: &FieldTable, options: &DeserializeOptions) -> Self {
        let (raw_name, raw_value) = match segment.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (segment, None),
        };

        let name = match table.by_wire_name(raw_name) {
            Some(descriptor) => descriptor.native_name().to_string(),
            None => {
                let decoded = codec::decode(raw_name, options);
                match table.by_wire_name(&decoded) {
                    Some(descriptor) => descriptor.native_name().to_string(),
                    None => decoded,
                }
            }
        };

        let value = raw_value
            .map(|value| codec::decode(value, options))
            .unwrap_or_default();

        WirePair {
            raw_name,
            raw_value,
            name,
            value,
        }
    }

    #[must_use]
    pub fn raw_name(&self) -> &'a str {
        self.raw_name
    }

    #[must_use]
    pub fn raw_value(&self) -> Option<&'a str> {
        self.raw_value
    }

    /// The resolved name: a native field name, or the decoded raw name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The decoded value, empty when the segment has none.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn has_value(&self) -> bool {
        !self.value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldAttributes, FormValue};

    fn table() -> FieldTable {
        FieldTable::from_fields(
            vec![
                ("email", FormValue::from("")),
                ("search", FormValue::from("")),
            ],
            |field| match field {
                "email" => FieldAttributes::renamed("emailAddress"),
                "search" => FieldAttributes::renamed("q[text]"),
                _ => FieldAttributes::default(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_wire_name_resolves_to_native_name() {
        let options = DeserializeOptions::default();
        let pair = WirePair::parse("emailAddress=john%40example.com", &table(), &options);
        assert_eq!(pair.raw_name(), "emailAddress");
        assert_eq!(pair.name(), "email");
        assert_eq!(pair.value(), "john@example.com");
    }

    #[test]
    fn test_wire_name_match_is_case_sensitive() {
        let options = DeserializeOptions::default();
        let pair = WirePair::parse("EmailAddress=x", &table(), &options);
        assert_eq!(pair.name(), "EmailAddress");
    }

    #[test]
    fn test_encoded_wire_name_resolves() {
        let options = DeserializeOptions::default();
        let pair = WirePair::parse("q%5Btext%5D=rust", &table(), &options);
        assert_eq!(pair.name(), "search");
    }

    #[test]
    fn test_split_on_first_equals_only() {
        let options = DeserializeOptions::default();
        let pair = WirePair::parse("expr=a=b", &table(), &options);
        assert_eq!(pair.name(), "expr");
        assert_eq!(pair.value(), "a=b");
    }

    #[test]
    fn test_missing_and_empty_values() {
        let options = DeserializeOptions::default();
        for segment in ["Int", "Int="] {
            let pair = WirePair::parse(segment, &table(), &options);
            assert_eq!(pair.name(), "Int");
            assert_eq!(pair.value(), "");
            assert!(!pair.has_value());
        }

        let nameless = WirePair::parse("=value", &table(), &options);
        assert_eq!(nameless.name(), "");
        assert!(nameless.has_value());
    }
}
