//! Form URL encoded serialization.
//!
//! Encoding happens in two steps. The record is first captured field by
//! field through serde into [`FormValue`]s, in declaration order. The
//! [`Serializer`] then applies the field descriptors and options to each
//! captured value and writes `name=value` pairs joined by `&`.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde::Serialize;
//! use serde_form::{to_string, FormRecord};
//!
//! #[derive(Serialize, Default)]
//! struct Search { q: String, page: u32, tags: Vec<String> }
//!
//! impl FormRecord for Search {}
//!
//! let search = Search {
//!     q: "rust serde".to_string(),
//!     page: 2,
//!     tags: vec!["web".to_string(), "forms".to_string()],
//! };
//! assert_eq!(to_string(&search).unwrap(), "q=rust+serde&page=2&tags=web,forms");
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use serde::Serialize;
//! use serde_form::{resolve, FormRecord, SerializeOptions, Serializer};
//!
//! #[derive(Serialize, Default)]
//! struct Point { x: i32, y: i32 }
//!
//! impl FormRecord for Point {}
//!
//! let table = resolve::<Point>().unwrap();
//! let options = SerializeOptions::new();
//! let mut serializer = Serializer::new(&options, &table);
//! serializer.write_record(&Point { x: 1, y: -2 }).unwrap();
//! assert_eq!(serializer.into_inner(), "x=1&y=-2");
//! ```

use crate::codec;
use crate::descriptor::{FieldDescriptor, FieldTable};
use crate::{EnumHandling, Error, FormValue, Number, Result, SerializeOptions};
use serde::{ser, Serialize};
use tracing::trace;

/// The form serializer.
///
/// Writes captured field values as wire pairs according to a [`FieldTable`]
/// and [`SerializeOptions`].
pub struct Serializer<'a> {
    output: String,
    options: &'a SerializeOptions,
    table: &'a FieldTable,
}

impl<'a> Serializer<'a> {
    pub fn new(options: &'a SerializeOptions, table: &'a FieldTable) -> Self {
        Serializer {
            output: String::with_capacity(128),
            options,
            table,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Writes every field of `record` that has a descriptor, in declaration order.
    pub fn write_record<T>(&mut self, record: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        for (name, value) in record_fields(record)? {
            match self.table.get(name) {
                Some(descriptor) => self.write_field(descriptor, value)?,
                None => trace!(field = name, "no descriptor, skipping field"),
            }
        }
        Ok(())
    }

    /// Writes one field, or nothing when the options omit it.
    pub fn write_field(&mut self, descriptor: &FieldDescriptor, value: FormValue) -> Result<()> {
        let options = self.options;

        if value.is_null() {
            if options.ignore_if_default || options.ignore_if_null {
                trace!(field = descriptor.native_name(), "omitting null field");
                return Ok(());
            }
            self.write_pair(descriptor.wire_name(), "");
            return Ok(());
        }

        if options.ignore_if_default && value.is_default() {
            trace!(field = descriptor.native_name(), "omitting default field");
            return Ok(());
        }

        let value = value.with_enum_handling(options.enum_handling);

        if let Some(converter) = descriptor.converter() {
            let text = converter.to_form_string(&value).map_err(|e| {
                e.for_field(
                    descriptor.native_name(),
                    &value.to_form_text(options.enum_handling),
                )
            })?;
            let encoded = codec::encode(&text, options, false);
            self.write_pair(descriptor.wire_name(), &encoded);
            return Ok(());
        }

        if !value.is_flat() {
            return Err(nested_without_converter(descriptor.native_name()));
        }

        let text = value.to_form_text(options.enum_handling);
        let escape_comma = !(descriptor.is_sequence() || value.is_sequence());
        let encoded = codec::encode(&text, options, escape_comma);
        self.write_pair(descriptor.wire_name(), &encoded);
        Ok(())
    }

    fn write_pair(&mut self, name: &str, encoded_value: &str) {
        if !self.output.is_empty() {
            self.output.push('&');
        }
        self.output
            .push_str(&codec::encode(name, self.options, true));
        self.output.push('=');
        self.output.push_str(encoded_value);
    }
}

/// Captures the fields of a record as `(field name, value)` pairs in
/// declaration order.
///
/// Nested structs, maps and data-carrying variants are captured as
/// [`FormValue::Record`] and [`FormValue::Variant`]. Whether a field may hold
/// one is decided later, against its descriptor.
///
/// # Errors
///
/// Fails with [`Error::UnsupportedType`] when `record` is not a struct, or a
/// map inside it has keys that are not scalars.
pub fn record_fields<T>(record: &T) -> Result<Vec<(&'static str, FormValue)>>
where
    T: ?Sized + Serialize,
{
    record.serialize(RecordSerializer)
}

/// Converts a single field value into a [`FormValue`].
pub fn to_value<T>(value: &T) -> Result<FormValue>
where
    T: ?Sized + Serialize,
{
    value.serialize(FormValueSerializer)
}

pub(crate) fn nested_without_converter(field: &str) -> Error {
    Error::unsupported_type(&format!(
        "field '{}': nested structs, maps and enum variants with data need a converter",
        field
    ))
}

fn top_level(kind: &str) -> Error {
    Error::unsupported_type(&format!("expected a struct at the top level, found {}", kind))
}

/// Accepts only a struct (or unit struct) at the top level.
struct RecordSerializer;

struct RecordFields {
    fields: Vec<(&'static str, FormValue)>,
}

type Fields = Vec<(&'static str, FormValue)>;

impl ser::Serializer for RecordSerializer {
    type Ok = Fields;
    type Error = Error;

    type SerializeSeq = ser::Impossible<Fields, Error>;
    type SerializeTuple = ser::Impossible<Fields, Error>;
    type SerializeTupleStruct = ser::Impossible<Fields, Error>;
    type SerializeTupleVariant = ser::Impossible<Fields, Error>;
    type SerializeMap = ser::Impossible<Fields, Error>;
    type SerializeStruct = RecordFields;
    type SerializeStructVariant = ser::Impossible<Fields, Error>;

    fn serialize_bool(self, _v: bool) -> Result<Fields> {
        Err(top_level("bool"))
    }

    fn serialize_i8(self, _v: i8) -> Result<Fields> {
        Err(top_level("integer"))
    }

    fn serialize_i16(self, _v: i16) -> Result<Fields> {
        Err(top_level("integer"))
    }

    fn serialize_i32(self, _v: i32) -> Result<Fields> {
        Err(top_level("integer"))
    }

    fn serialize_i64(self, _v: i64) -> Result<Fields> {
        Err(top_level("integer"))
    }

    fn serialize_u8(self, _v: u8) -> Result<Fields> {
        Err(top_level("integer"))
    }

    fn serialize_u16(self, _v: u16) -> Result<Fields> {
        Err(top_level("integer"))
    }

    fn serialize_u32(self, _v: u32) -> Result<Fields> {
        Err(top_level("integer"))
    }

    fn serialize_u64(self, _v: u64) -> Result<Fields> {
        Err(top_level("integer"))
    }

    fn serialize_f32(self, _v: f32) -> Result<Fields> {
        Err(top_level("float"))
    }

    fn serialize_f64(self, _v: f64) -> Result<Fields> {
        Err(top_level("float"))
    }

    fn serialize_char(self, _v: char) -> Result<Fields> {
        Err(top_level("char"))
    }

    fn serialize_str(self, _v: &str) -> Result<Fields> {
        Err(top_level("string"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Fields> {
        Err(top_level("bytes"))
    }

    fn serialize_none(self) -> Result<Fields> {
        Err(top_level("none"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Fields>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Fields> {
        Err(top_level("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Fields> {
        Ok(Vec::new())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Fields> {
        Err(top_level("enum"))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Fields>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Fields>
    where
        T: ?Sized + Serialize,
    {
        Err(top_level("enum"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(top_level("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(top_level("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(top_level("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(top_level("enum"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(top_level("map"))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<RecordFields> {
        Ok(RecordFields {
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(top_level("enum"))
    }
}

impl ser::SerializeStruct for RecordFields {
    type Ok = Fields;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = to_value(value).map_err(|e| match e {
            Error::UnsupportedType(msg) => {
                Error::unsupported_type(&format!("field '{}': {}", key, msg))
            }
            other => other,
        })?;
        self.fields.push((key, value));
        Ok(())
    }

    fn skip_field(&mut self, key: &'static str) -> Result<()> {
        trace!(field = key, "field skipped by serde");
        Ok(())
    }

    fn end(self) -> Result<Fields> {
        Ok(self.fields)
    }
}

/// Serializes a single field value into a [`FormValue`].
pub struct FormValueSerializer;

pub struct SerializeVec {
    vec: Vec<FormValue>,
    variant: Option<(u32, &'static str)>,
}

pub struct SerializeRecord {
    entries: Vec<(String, FormValue)>,
    current_key: Option<String>,
    variant: Option<(u32, &'static str)>,
}

impl SerializeVec {
    fn new(len: Option<usize>, variant: Option<(u32, &'static str)>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(len.unwrap_or(0)),
            variant,
        }
    }
}

impl SerializeRecord {
    fn new(len: Option<usize>, variant: Option<(u32, &'static str)>) -> Self {
        SerializeRecord {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            current_key: None,
            variant,
        }
    }
}

fn wrap_variant(variant: Option<(u32, &'static str)>, value: FormValue) -> FormValue {
    match variant {
        Some((index, name)) => FormValue::Variant {
            index,
            name: name.to_string(),
            value: Box::new(value),
        },
        None => value,
    }
}

impl ser::Serializer for FormValueSerializer {
    type Ok = FormValue;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeRecord;
    type SerializeStruct = SerializeRecord;
    type SerializeStructVariant = SerializeRecord;

    fn serialize_bool(self, v: bool) -> Result<FormValue> {
        Ok(FormValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<FormValue> {
        Ok(FormValue::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<FormValue> {
        Ok(FormValue::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<FormValue> {
        Ok(FormValue::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<FormValue> {
        Ok(FormValue::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<FormValue> {
        Ok(FormValue::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<FormValue> {
        Ok(FormValue::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<FormValue> {
        Ok(FormValue::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<FormValue> {
        Ok(FormValue::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<FormValue> {
        Ok(FormValue::Number(Number::from_f32(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<FormValue> {
        Ok(FormValue::Number(Number::Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<FormValue> {
        Ok(FormValue::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<FormValue> {
        Ok(FormValue::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<FormValue> {
        Ok(FormValue::Sequence(
            v.iter().map(|&b| FormValue::from(b)).collect(),
        ))
    }

    fn serialize_none(self) -> Result<FormValue> {
        Ok(FormValue::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<FormValue>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<FormValue> {
        Ok(FormValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<FormValue> {
        Ok(FormValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<FormValue> {
        Ok(FormValue::Enum {
            index: variant_index,
            name: variant.to_string(),
        })
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<FormValue>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<FormValue>
    where
        T: ?Sized + Serialize,
    {
        Ok(wrap_variant(Some((variant_index, variant)), to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(Some(len), None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(Some(len), None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(Some(len), Some((variant_index, variant))))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new(len, None))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new(Some(len), None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new(Some(len), Some((variant_index, variant))))
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = FormValue;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<FormValue> {
        Ok(wrap_variant(self.variant, FormValue::Sequence(self.vec)))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = FormValue;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<FormValue> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = FormValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<FormValue> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = FormValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<FormValue> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeMap for SerializeRecord {
    type Ok = FormValue;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = to_value(key)?;
        if key.is_null() || key.is_sequence() || !key.is_flat() {
            return Err(Error::unsupported_type("map keys must be scalars"));
        }
        self.current_key = Some(key.to_form_text(EnumHandling::Name));
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.entries.push((key, to_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<FormValue> {
        Ok(wrap_variant(self.variant, FormValue::Record(self.entries)))
    }
}

impl ser::SerializeStruct for SerializeRecord {
    type Ok = FormValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entries.push((key.to_string(), to_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<FormValue> {
        ser::SerializeMap::end(self)
    }
}

impl ser::SerializeStructVariant for SerializeRecord {
    type Ok = FormValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeStruct::serialize_field(self, key, value)
    }

    fn end(self) -> Result<FormValue> {
        ser::SerializeMap::end(self)
    }
}
