//! Dynamic representation of a single form field value.
//!
//! [`FormValue`] is what the encoder sees after capturing a record field
//! through serde, and what a [`ValueConverter`](crate::ValueConverter)
//! receives and returns. Flat shapes (scalars, unit enum variants and
//! sequences of those) are what the wire carries directly. Nested structs,
//! maps and data-carrying variants are captured too, as [`FormValue::Record`]
//! and [`FormValue::Variant`], so ignored fields and converter-bound fields
//! can hold them.
//!
//! ```rust
//! use serde_form::{EnumHandling, FormValue};
//!
//! let tags = FormValue::from(vec!["rust", "serde"]);
//! assert!(tags.is_sequence());
//! assert_eq!(tags.to_form_text(EnumHandling::Number), "rust,serde");
//!
//! let light = FormValue::Enum { index: 2, name: "Yellow".to_string() };
//! assert_eq!(light.to_form_text(EnumHandling::Number), "2");
//! assert_eq!(light.to_form_text(EnumHandling::Name), "Yellow");
//! ```

use crate::EnumHandling;
use std::fmt;

/// A dynamically-typed field value.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum FormValue {
    /// `None` or `()`.
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    Char(char),
    String(String),
    /// A multi-value field, written as a comma-joined list.
    Sequence(Vec<FormValue>),
    /// A unit enum variant with its declaration index and name.
    Enum { index: u32, name: String },
    /// A nested struct or map, as `(key, value)` entries in order.
    Record(Vec<(String, FormValue)>),
    /// An enum variant carrying data. Newtype variants hold their inner
    /// value, tuple variants a sequence and struct variants a record.
    Variant {
        index: u32,
        name: String,
        value: Box<FormValue>,
    },
}

/// A numeric field value.
///
/// # Examples
///
/// ```rust
/// use serde_form::Number;
///
/// assert_eq!(Number::Integer(-3).to_string(), "-3");
/// assert_eq!(Number::from_f32(0.1).to_string(), "0.1");
/// assert!(Number::Unsigned(0).is_zero());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Unsigned(u64),
    Float(f64),
}

impl Number {
    /// Widens an `f32` while keeping its shortest decimal representation,
    /// so `0.1f32` prints as `0.1` rather than `0.10000000149011612`.
    #[must_use]
    pub fn from_f32(v: f32) -> Self {
        let widened = v.to_string().parse::<f64>().unwrap_or(f64::from(v));
        Number::Float(widened)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        match *self {
            Number::Integer(i) => i == 0,
            Number::Unsigned(u) => u == 0,
            Number::Float(f) => f == 0.0,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Integer(i) => Some(i),
            Number::Unsigned(u) => i64::try_from(u).ok(),
            Number::Float(_) => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Number::Integer(i) => u64::try_from(i).ok(),
            Number::Unsigned(u) => Some(u),
            Number::Float(_) => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Integer(i) => i as f64,
            Number::Unsigned(u) => u as f64,
            Number::Float(f) => f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Unsigned(u) => write!(f, "{}", u),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

impl FormValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, FormValue::Null)
    }

    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self, FormValue::Sequence(_))
    }

    #[must_use]
    pub fn is_enum(&self) -> bool {
        matches!(self, FormValue::Enum { .. })
    }

    /// Returns `true` for values the wire can carry without a converter.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_form::FormValue;
    ///
    /// assert!(FormValue::from(vec![1u8, 2]).is_flat());
    /// assert!(!FormValue::Record(vec![("r".to_string(), FormValue::from(1u8))]).is_flat());
    /// ```
    #[must_use]
    pub fn is_flat(&self) -> bool {
        match self {
            FormValue::Record(_) | FormValue::Variant { .. } => false,
            FormValue::Sequence(items) => items.iter().all(FormValue::is_flat),
            _ => true,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FormValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FormValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            FormValue::Number(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_sequence(&self) -> Option<&[FormValue]> {
        match self {
            FormValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&[(String, FormValue)]> {
        match self {
            FormValue::Record(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up an entry of a record by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.as_record()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` when the value equals its type's zero value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_form::FormValue;
    ///
    /// assert!(FormValue::Null.is_default());
    /// assert!(FormValue::from(0u8).is_default());
    /// assert!(FormValue::from('\0').is_default());
    /// assert!(FormValue::Enum { index: 0, name: "Red".into() }.is_default());
    /// assert!(!FormValue::from("x").is_default());
    /// ```
    #[must_use]
    pub fn is_default(&self) -> bool {
        match self {
            FormValue::Null => true,
            FormValue::Bool(b) => !b,
            FormValue::Number(n) => n.is_zero(),
            FormValue::Char(c) => *c == '\0',
            FormValue::String(s) => s.is_empty(),
            FormValue::Sequence(items) => items.is_empty(),
            FormValue::Enum { index, .. } => *index == 0,
            FormValue::Record(entries) => entries.iter().all(|(_, v)| v.is_default()),
            FormValue::Variant { .. } => false,
        }
    }

    /// Replaces an enum variant by its index when enums travel as numbers.
    #[must_use]
    pub fn with_enum_handling(self, handling: EnumHandling) -> Self {
        match (self, handling) {
            (FormValue::Enum { index, .. }, EnumHandling::Number) => {
                FormValue::Number(Number::Unsigned(u64::from(index)))
            }
            (FormValue::Sequence(items), handling) => FormValue::Sequence(
                items
                    .into_iter()
                    .map(|item| item.with_enum_handling(handling))
                    .collect(),
            ),
            (FormValue::Record(entries), handling) => FormValue::Record(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, v.with_enum_handling(handling)))
                    .collect(),
            ),
            (FormValue::Variant { index, name, value }, handling) => FormValue::Variant {
                index,
                name,
                value: Box::new((*value).with_enum_handling(handling)),
            },
            (value, _) => value,
        }
    }

    /// Renders the value as unencoded wire text.
    ///
    /// Sequences and record values are joined with `,`; null renders as the
    /// empty string. A data-carrying variant renders its inner value.
    #[must_use]
    pub fn to_form_text(&self, handling: EnumHandling) -> String {
        let mut out = String::new();
        self.write_form_text(&mut out, handling);
        out
    }

    fn write_form_text(&self, out: &mut String, handling: EnumHandling) {
        match self {
            FormValue::Null => {}
            FormValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            FormValue::Number(n) => out.push_str(&n.to_string()),
            FormValue::Char(c) => out.push(*c),
            FormValue::String(s) => out.push_str(s),
            FormValue::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_form_text(out, handling);
                }
            }
            FormValue::Record(entries) => {
                for (i, (_, item)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_form_text(out, handling);
                }
            }
            FormValue::Variant { value, .. } => value.write_form_text(out, handling),
            FormValue::Enum { index, name } => match handling {
                EnumHandling::Number => out.push_str(&index.to_string()),
                EnumHandling::Name => out.push_str(name),
            },
        }
    }
}

impl From<bool> for FormValue {
    fn from(v: bool) -> Self {
        FormValue::Bool(v)
    }
}

macro_rules! from_signed {
    ($($ty:ty)*) => {$(
        impl From<$ty> for FormValue {
            fn from(v: $ty) -> Self {
                FormValue::Number(Number::Integer(i64::from(v)))
            }
        }
    )*};
}

macro_rules! from_unsigned {
    ($($ty:ty)*) => {$(
        impl From<$ty> for FormValue {
            fn from(v: $ty) -> Self {
                FormValue::Number(Number::Unsigned(u64::from(v)))
            }
        }
    )*};
}

from_signed!(i8 i16 i32 i64);
from_unsigned!(u8 u16 u32 u64);

impl From<f32> for FormValue {
    fn from(v: f32) -> Self {
        FormValue::Number(Number::from_f32(v))
    }
}

impl From<f64> for FormValue {
    fn from(v: f64) -> Self {
        FormValue::Number(Number::Float(v))
    }
}

impl From<char> for FormValue {
    fn from(v: char) -> Self {
        FormValue::Char(v)
    }
}

impl From<&str> for FormValue {
    fn from(v: &str) -> Self {
        FormValue::String(v.to_string())
    }
}

impl From<String> for FormValue {
    fn from(v: String) -> Self {
        FormValue::String(v)
    }
}

impl<T: Into<FormValue>> From<Vec<T>> for FormValue {
    fn from(v: Vec<T>) -> Self {
        FormValue::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FormValue>> From<Option<T>> for FormValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FormValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_text_scalars() {
        let handling = EnumHandling::Number;
        assert_eq!(FormValue::from(true).to_form_text(handling), "true");
        assert_eq!(FormValue::from(-7i32).to_form_text(handling), "-7");
        assert_eq!(FormValue::from(2000u64).to_form_text(handling), "2000");
        assert_eq!(FormValue::from(0.02f64).to_form_text(handling), "0.02");
        assert_eq!(FormValue::from(0.1f32).to_form_text(handling), "0.1");
        assert_eq!(FormValue::from('A').to_form_text(handling), "A");
        assert_eq!(FormValue::Null.to_form_text(handling), "");
    }

    #[test]
    fn test_form_text_sequence() {
        let value = FormValue::from(vec![1u8, 2, 3]);
        assert_eq!(value.to_form_text(EnumHandling::Number), "1,2,3");
        assert_eq!(
            FormValue::Sequence(vec![]).to_form_text(EnumHandling::Number),
            ""
        );
    }

    #[test]
    fn test_with_enum_handling() {
        let value = FormValue::Enum {
            index: 1,
            name: "Amber".to_string(),
        };
        assert_eq!(
            value.clone().with_enum_handling(EnumHandling::Number),
            FormValue::Number(Number::Unsigned(1))
        );
        assert_eq!(value.clone().with_enum_handling(EnumHandling::Name), value);
    }

    #[test]
    fn test_is_default() {
        assert!(FormValue::from(false).is_default());
        assert!(FormValue::from(0.0f64).is_default());
        assert!(FormValue::from("").is_default());
        assert!(FormValue::Sequence(vec![]).is_default());
        assert!(!FormValue::from(true).is_default());
        assert!(!FormValue::from(vec![0u8]).is_default());
        assert!(!FormValue::Enum {
            index: 1,
            name: "Amber".to_string()
        }
        .is_default());
    }

    #[test]
    fn test_record_values() {
        let record = FormValue::Record(vec![
            ("r".to_string(), FormValue::from(255u8)),
            ("g".to_string(), FormValue::from(0u8)),
        ]);
        assert!(!record.is_flat());
        assert!(!record.is_default());
        assert_eq!(record.get("r"), Some(&FormValue::from(255u8)));
        assert_eq!(record.get("b"), None);
        assert_eq!(record.to_form_text(EnumHandling::Number), "255,0");
        assert!(FormValue::Record(vec![("g".to_string(), FormValue::from(0u8))]).is_default());
        assert!(!FormValue::Sequence(vec![record]).is_flat());
    }

    #[test]
    fn test_number_accessors() {
        assert_eq!(Number::Integer(5).as_u64(), Some(5));
        assert_eq!(Number::Integer(-5).as_u64(), None);
        assert_eq!(Number::Unsigned(u64::MAX).as_i64(), None);
        assert_eq!(Number::Float(1.5).as_i64(), None);
        assert_eq!(Number::Unsigned(3).as_f64(), 3.0);
    }
}
