//! Percent-encoding of individual names and values.
//!
//! Everything outside the RFC 3986 unreserved set (`A-Z a-z 0-9 - _ . ~`)
//! is escaped, non-ASCII characters as their UTF-8 bytes. Spaces become `+`
//! when [`SerializeOptions::encode_space_as_plus`] is set, and a literal `+`
//! decodes to a space when [`DeserializeOptions::decode_plus_as_space`] is set.
//!
//! ```rust
//! use serde_form::codec;
//! use serde_form::{DeserializeOptions, SerializeOptions};
//!
//! let ser = SerializeOptions::default();
//! assert_eq!(codec::encode("john smith", &ser, true), "john+smith");
//! assert_eq!(codec::encode("a,b", &ser, true), "a%2Cb");
//! assert_eq!(codec::encode("a,b", &ser, false), "a,b");
//!
//! let de = DeserializeOptions::default();
//! assert_eq!(codec::decode("john+smith", &de), "john smith");
//! assert_eq!(codec::decode("john%20smith", &de), "john smith");
//! ```

use crate::{DeserializeOptions, SerializeOptions};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Every byte except the RFC 3986 unreserved characters.
const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const ENCODED_SPACE: &str = "%20";
const ENCODED_COMMA: &str = "%2C";

/// Percent-encodes a single name or value.
///
/// With `escape_comma` unset, commas are left literal so that comma-joined
/// sequences keep their separators.
#[must_use]
pub fn encode(value: &str, options: &SerializeOptions, escape_comma: bool) -> String {
    if value.is_empty() {
        return String::new();
    }

    if !options.encode {
        return value.to_string();
    }

    let mut escaped = utf8_percent_encode(value, FORM_ENCODE_SET).to_string();

    // Every '%' in `escaped` starts a three byte escape, so plain substring
    // replacement cannot split an escape.
    if !escape_comma {
        escaped = escaped.replace(ENCODED_COMMA, ",");
    }

    if options.encode_space_as_plus {
        escaped = escaped.replace(ENCODED_SPACE, "+");
    }

    escaped
}

/// Percent-decodes a single name or value.
///
/// Malformed escapes are kept literally and invalid UTF-8 is replaced with
/// `U+FFFD`.
#[must_use]
pub fn decode(value: &str, options: &DeserializeOptions) -> String {
    if value.is_empty() {
        return String::new();
    }

    if !options.decode {
        return value.to_string();
    }

    if options.decode_plus_as_space && value.contains('+') {
        let value = value.replace('+', ENCODED_SPACE);
        return percent_decode_str(&value).decode_utf8_lossy().into_owned();
    }

    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESERVED: [(&str, &str); 18] = [
        ("!", "%21"),
        ("#", "%23"),
        ("$", "%24"),
        ("&", "%26"),
        ("'", "%27"),
        ("(", "%28"),
        (")", "%29"),
        ("*", "%2A"),
        ("+", "%2B"),
        (",", "%2C"),
        ("/", "%2F"),
        (":", "%3A"),
        (";", "%3B"),
        ("=", "%3D"),
        ("?", "%3F"),
        ("@", "%40"),
        ("[", "%5B"),
        ("]", "%5D"),
    ];

    #[test]
    fn test_encode_reserved_characters() {
        let options = SerializeOptions::default();
        for (raw, escaped) in RESERVED {
            assert_eq!(encode(raw, &options, true), escaped, "encoding {raw}");
        }
    }

    #[test]
    fn test_decode_reserved_characters() {
        let options = DeserializeOptions::default();
        for (raw, escaped) in RESERVED {
            assert_eq!(decode(escaped, &options), raw, "decoding {escaped}");
        }
    }

    #[test]
    fn test_unreserved_characters_untouched() {
        let options = SerializeOptions::default();
        for value in [
            "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            "abcdefghijklmnopqrstuvwxyz",
            "0123456789",
            "-_.~",
        ] {
            assert_eq!(encode(value, &options, true), value);
        }
    }

    #[test]
    fn test_space_handling() {
        let plus = SerializeOptions::default();
        let percent = SerializeOptions::default().with_encode_space_as_plus(false);

        assert_eq!(encode("john smith", &plus, true), "john+smith");
        assert_eq!(encode("john smith", &percent, true), "john%20smith");
    }

    #[test]
    fn test_encode_disabled_returns_input() {
        let options = SerializeOptions::raw();
        assert_eq!(encode("john smith&co", &options, true), "john smith&co");
    }

    #[test]
    fn test_unescaped_comma_keeps_other_escapes() {
        let options = SerializeOptions::default();
        assert_eq!(encode("a b,c&d", &options, false), "a+b,c%26d");
    }

    #[test]
    fn test_literal_percent_is_not_mistaken_for_space() {
        let options = SerializeOptions::default();
        assert_eq!(encode("%20", &options, true), "%2520");
        assert_eq!(decode("%2520", &DeserializeOptions::default()), "%20");
    }

    #[test]
    fn test_non_ascii_round_trip() {
        let encoded = encode("café", &SerializeOptions::default(), true);
        assert_eq!(encoded, "caf%C3%A9");
        assert_eq!(decode(&encoded, &DeserializeOptions::default()), "café");
    }

    #[test]
    fn test_decode_plus_handling() {
        let plus = DeserializeOptions::default();
        let literal = DeserializeOptions::default().with_decode_plus_as_space(false);

        assert_eq!(decode("john+smith", &plus), "john smith");
        assert_eq!(decode("john+smith", &literal), "john+smith");
        assert_eq!(decode("john%20smith", &literal), "john smith");
        assert_eq!(decode("1%2B1", &plus), "1+1");
    }

    #[test]
    fn test_decode_disabled_returns_input() {
        assert_eq!(decode("a%20b+c", &DeserializeOptions::raw()), "a%20b+c");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(encode("", &SerializeOptions::default(), true), "");
        assert_eq!(decode("", &DeserializeOptions::default()), "");
    }

    #[test]
    fn test_malformed_escape_passes_through() {
        assert_eq!(decode("100%zz", &DeserializeOptions::default()), "100%zz");
    }
}
