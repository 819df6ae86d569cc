//! Form URL encoded deserialization.
//!
//! Decoding starts from the values of `T::default()`. Each `&`-separated
//! segment of the input is parsed into a [`WirePair`], matched to a field
//! and overlaid on those defaults, last write wins. The resulting field map
//! is then handed to `T`'s `Deserialize` impl, which drives the coercion of
//! each decoded string into the field's declared type.
//!
//! ## Usage
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_form::{from_str, FormRecord};
//!
//! #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
//! struct Login { user: String, remember: bool, attempts: u8 }
//!
//! impl FormRecord for Login {}
//!
//! let login: Login = from_str("user=john+smith&remember=true").unwrap();
//! assert_eq!(login, Login { user: "john smith".to_string(), remember: true, attempts: 0 });
//! ```
//!
//! ## Coercion
//!
//! Wire values are text; the field type decides how that text is read:
//!
//! - integers and floats use Rust's `FromStr` for the type
//! - booleans accept `true`/`false` in any letter case
//! - `char` requires exactly one character
//! - sequences split on `,` without trimming
//! - enums read a variant index or a variant name, per [`EnumHandling`]

use crate::descriptor::FieldTable;
use crate::pair::WirePair;
use crate::{DeserializeOptions, EnumHandling, Error, FormValue, Number, Result};
use indexmap::IndexMap;
use serde::de::{self, IntoDeserializer, Unexpected};
use serde::forward_to_deserialize_any;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// The form deserializer.
///
/// Holds one value per record field, seeded with the record's defaults and
/// overwritten by [`Deserializer::populate`].
pub struct Deserializer {
    fields: IndexMap<&'static str, FormValue>,
    enum_handling: EnumHandling,
}

impl Deserializer {
    /// Creates a deserializer seeded with default field values.
    pub fn new(defaults: Vec<(&'static str, FormValue)>, options: &DeserializeOptions) -> Self {
        Deserializer {
            fields: defaults.into_iter().collect(),
            enum_handling: options.enum_handling,
        }
    }

    /// Applies every pair of `input` that names a field in `table`.
    ///
    /// Pairs without a value and pairs naming no field are skipped.
    ///
    /// # Errors
    ///
    /// Returns a format error when a field's converter rejects its value.
    pub fn populate(
        &mut self,
        input: &str,
        table: &FieldTable,
        options: &DeserializeOptions,
    ) -> Result<()> {
        let mut segments = 0usize;
        let mut applied = 0usize;

        for segment in input.split('&') {
            segments += 1;
            let pair = WirePair::parse(segment, table, options);

            if !pair.has_value() {
                trace!(segment, "pair has no value, skipping");
                continue;
            }

            let Some(descriptor) = table.get(pair.name()) else {
                trace!(name = pair.name(), "no matching field, skipping");
                continue;
            };

            if descriptor.is_ignored() {
                continue;
            }

            let value = match descriptor.converter() {
                Some(converter) => converter
                    .from_form_string(pair.value())
                    .map_err(|e| e.for_field(descriptor.native_name(), pair.value()))?,
                None if descriptor.is_sequence() => FormValue::Sequence(split_sequence(pair.value())),
                None => FormValue::String(pair.value().to_string()),
            };

            self.fields.insert(descriptor.native_name(), value);
            applied += 1;
        }

        debug!(segments, applied, "parsed form data");
        Ok(())
    }
}

fn split_sequence(text: &str) -> Vec<FormValue> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(',')
        .map(|item| FormValue::String(item.to_string()))
        .collect()
}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(FieldMapAccess {
            iter: self.fields.into_iter(),
            pending: None,
            enum_handling: self.enum_handling,
        })
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct FieldMapAccess {
    iter: indexmap::map::IntoIter<&'static str, FormValue>,
    pending: Option<(&'static str, FormValue)>,
    enum_handling: EnumHandling,
}

impl<'de> de::MapAccess<'de> for FieldMapAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((name, value)) => {
                self.pending = Some((name, value));
                let key: de::value::StrDeserializer<'static, Error> = name.into_deserializer();
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let (name, value) = self
            .pending
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called before next_key_seed"))?;
        let raw = value.to_form_text(self.enum_handling);
        seed.deserialize(ValueDeserializer::new(value, self.enum_handling))
            .map_err(|e| e.for_field(name, &raw))
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct ValueSeqAccess {
    iter: std::vec::IntoIter<FormValue>,
    enum_handling: EnumHandling,
}

impl ValueSeqAccess {
    fn new(items: Vec<FormValue>, enum_handling: EnumHandling) -> Self {
        ValueSeqAccess {
            iter: items.into_iter(),
            enum_handling,
        }
    }
}

impl<'de> de::SeqAccess<'de> for ValueSeqAccess {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(ValueDeserializer::new(value, self.enum_handling))
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

/// Iterates the entries of a [`FormValue::Record`].
struct RecordAccess {
    iter: std::vec::IntoIter<(String, FormValue)>,
    pending: Option<FormValue>,
    enum_handling: EnumHandling,
}

impl RecordAccess {
    fn new(entries: Vec<(String, FormValue)>, enum_handling: EnumHandling) -> Self {
        RecordAccess {
            iter: entries.into_iter(),
            pending: None,
            enum_handling,
        }
    }
}

impl<'de> de::MapAccess<'de> for RecordAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.pending = Some(value);
                seed.deserialize(TextDeserializer::new(key, self.enum_handling))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let value = self
            .pending
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called before next_key_seed"))?;
        seed.deserialize(ValueDeserializer::new(value, self.enum_handling))
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

enum VariantKey {
    Name(String),
    Index(u32),
}

/// Enum access for a variant named by key, with its payload if it has one.
struct ValueEnumAccess {
    key: VariantKey,
    payload: Option<FormValue>,
    enum_handling: EnumHandling,
}

impl ValueEnumAccess {
    fn unit(key: VariantKey, enum_handling: EnumHandling) -> Self {
        ValueEnumAccess {
            key,
            payload: None,
            enum_handling,
        }
    }
}

impl<'de> de::EnumAccess<'de> for ValueEnumAccess {
    type Error = Error;
    type Variant = ValueVariantAccess;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = match self.key {
            VariantKey::Name(name) => {
                let key: de::value::StringDeserializer<Error> = name.into_deserializer();
                seed.deserialize(key)?
            }
            VariantKey::Index(index) => {
                let key: de::value::U32Deserializer<Error> = index.into_deserializer();
                seed.deserialize(key)?
            }
        };
        let access = ValueVariantAccess {
            payload: self.payload,
            enum_handling: self.enum_handling,
        };
        Ok((variant, access))
    }
}

struct ValueVariantAccess {
    payload: Option<FormValue>,
    enum_handling: EnumHandling,
}

impl ValueVariantAccess {
    fn payload(self, expected: &'static str) -> Result<ValueDeserializer> {
        match self.payload {
            Some(value) => Ok(ValueDeserializer::new(value, self.enum_handling)),
            None => Err(de::Error::invalid_type(Unexpected::UnitVariant, &expected)),
        }
    }
}

impl<'de> de::VariantAccess<'de> for ValueVariantAccess {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.payload {
            None | Some(FormValue::Null) => Ok(()),
            Some(_) => Err(de::Error::invalid_type(
                Unexpected::NewtypeVariant,
                &"unit variant",
            )),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self.payload("newtype variant")?)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self.payload("tuple variant")?, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_any(self.payload("struct variant")?, visitor)
    }
}

/// Deserializes a captured or converted [`FormValue`].
///
/// String values are wire text and are coerced by [`TextDeserializer`].
struct ValueDeserializer {
    value: FormValue,
    enum_handling: EnumHandling,
}

impl ValueDeserializer {
    fn new(value: FormValue, enum_handling: EnumHandling) -> Self {
        ValueDeserializer {
            value,
            enum_handling,
        }
    }
}

macro_rules! forward_strings_to_text {
    ($($method:ident)*) => {$(
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            match self.value {
                FormValue::String(text) => de::Deserializer::$method(
                    TextDeserializer::new(text, self.enum_handling),
                    visitor,
                ),
                other => de::Deserializer::deserialize_any(
                    ValueDeserializer::new(other, self.enum_handling),
                    visitor,
                ),
            }
        }
    )*};
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            FormValue::Null => visitor.visit_unit(),
            FormValue::Bool(b) => visitor.visit_bool(b),
            FormValue::Number(Number::Integer(i)) => visitor.visit_i64(i),
            FormValue::Number(Number::Unsigned(u)) => visitor.visit_u64(u),
            FormValue::Number(Number::Float(f)) => visitor.visit_f64(f),
            FormValue::Char(c) => visitor.visit_char(c),
            FormValue::String(s) => visitor.visit_string(s),
            FormValue::Sequence(items) => {
                visitor.visit_seq(ValueSeqAccess::new(items, self.enum_handling))
            }
            FormValue::Enum { name, .. } => visitor.visit_string(name),
            FormValue::Record(entries) => {
                visitor.visit_map(RecordAccess::new(entries, self.enum_handling))
            }
            FormValue::Variant { name, value, .. } => visitor.visit_enum(ValueEnumAccess {
                key: VariantKey::Name(name),
                payload: Some(*value),
                enum_handling: self.enum_handling,
            }),
        }
    }

    forward_strings_to_text! {
        deserialize_bool deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
        deserialize_f32 deserialize_f64 deserialize_char deserialize_str deserialize_string
        deserialize_bytes deserialize_byte_buf deserialize_unit deserialize_seq
        deserialize_identifier
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            FormValue::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            FormValue::Enum { name: variant, .. } => visitor.visit_enum(ValueEnumAccess::unit(
                VariantKey::Name(variant),
                self.enum_handling,
            )),
            FormValue::Variant {
                name: variant,
                value,
                ..
            } => visitor.visit_enum(ValueEnumAccess {
                key: VariantKey::Name(variant),
                payload: Some(*value),
                enum_handling: self.enum_handling,
            }),
            FormValue::String(text) => de::Deserializer::deserialize_enum(
                TextDeserializer::new(text, self.enum_handling),
                name,
                variants,
                visitor,
            ),
            FormValue::Number(n) => {
                let index = n
                    .as_u64()
                    .and_then(|i| u32::try_from(i).ok())
                    .ok_or_else(|| Error::custom(format!("'{}' is not a variant index", n)))?;
                visitor.visit_enum(ValueEnumAccess::unit(
                    VariantKey::Index(index),
                    self.enum_handling,
                ))
            }
            other => Err(Error::custom(format!(
                "expected an enum variant, found {:?}",
                other
            ))),
        }
    }

    forward_to_deserialize_any! {
        i128 u128 unit_struct map struct ignored_any
    }
}

/// Coerces decoded wire text into the type requested by the visitor.
pub struct TextDeserializer {
    text: String,
    enum_handling: EnumHandling,
}

impl TextDeserializer {
    pub fn new(text: String, enum_handling: EnumHandling) -> Self {
        TextDeserializer {
            text,
            enum_handling,
        }
    }

    fn parse<T>(&self) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.text.parse().map_err(Error::custom)
    }

    fn parse_bool(&self) -> Result<bool> {
        if self.text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if self.text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(Error::custom("expected `true` or `false`"))
        }
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident,)*) => {$(
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            visitor.$visit(self.parse()?)
        }
    )*};
}

impl<'de> de::Deserializer<'de> for TextDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.text)
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_bool(self.parse_bool()?)
    }

    deserialize_parsed! {
        deserialize_i8 => visit_i8,
        deserialize_i16 => visit_i16,
        deserialize_i32 => visit_i32,
        deserialize_i64 => visit_i64,
        deserialize_i128 => visit_i128,
        deserialize_u8 => visit_u8,
        deserialize_u16 => visit_u16,
        deserialize_u32 => visit_u32,
        deserialize_u64 => visit_u64,
        deserialize_u128 => visit_u128,
        deserialize_f32 => visit_f32,
        deserialize_f64 => visit_f64,
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let mut chars = self.text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(Error::custom("expected a single character")),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.text)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.text)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_bytes(self.text.as_bytes())
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_byte_buf(self.text.into_bytes())
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let items = split_sequence(&self.text);
        visitor.visit_seq(ValueSeqAccess::new(items, self.enum_handling))
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported_type("nested maps"))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported_type(&format!("nested struct {}", name)))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let key = match self.enum_handling {
            EnumHandling::Name => VariantKey::Name(self.text),
            EnumHandling::Number => VariantKey::Index(
                self.text
                    .parse()
                    .map_err(|_| Error::custom("expected a variant index"))?,
            ),
        };
        visitor.visit_enum(ValueEnumAccess::unit(key, self.enum_handling))
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.text)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}
