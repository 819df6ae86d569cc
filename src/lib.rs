//! # serde_form
//!
//! Converts typed records to and from `application/x-www-form-urlencoded`
//! text, the body format of HTML form posts and many OAuth and payment APIs.
//!
//! ## Key Features
//!
//! - **Serde based**: records are plain `#[derive(Serialize, Deserialize)]` structs
//! - **Field metadata**: rename or ignore fields, or bind a [`ValueConverter`]
//! - **Sequences**: `Vec` fields travel as comma-joined lists (`tags=a,b`)
//! - **Enums**: by variant index or by name, see [`EnumHandling`]
//! - **Encoding control**: `+` or `%20` for spaces, or no percent-encoding at all
//! - **Omission rules**: skip null or default-valued fields when encoding
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_form::{form_record, from_str, to_string, FieldAttributes};
//!
//! #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
//! struct Signup {
//!     name: String,
//!     email: String,
//!     age: u8,
//!     interests: Vec<String>,
//! }
//!
//! form_record!(Signup {
//!     "email" => FieldAttributes::renamed("emailAddress"),
//! });
//!
//! let signup = Signup {
//!     name: "John Smith".to_string(),
//!     email: "john@example.com".to_string(),
//!     age: 42,
//!     interests: vec!["rust".to_string(), "serde".to_string()],
//! };
//!
//! let form = to_string(&signup).unwrap();
//! assert_eq!(form, "name=John+Smith&emailAddress=john%40example.com&age=42&interests=rust,serde");
//!
//! let back: Signup = from_str(&form).unwrap();
//! assert_eq!(back, signup);
//! ```
//!
//! ## Records
//!
//! A record is a flat struct implementing [`FormRecord`], which requires
//! `Serialize + Default` (and `Deserialize` for decoding). Fields are
//! written in declaration order. Decoding starts from `T::default()`, so
//! fields missing from the input keep their default value.
//!
//! Supported field types are booleans, integers, floats, `char`, strings,
//! unit-variant enums, `Option`s of those, and sequences of those. A field
//! holding a nested struct, map or data-carrying enum variant is rejected
//! with [`Error::UnsupportedType`] unless it is ignored or bound to a
//! [`ValueConverter`], which then owns its wire text.
//!
//! ## Decoding Rules
//!
//! - pairs without a value (`Int`, `Int=`) leave the field at its default
//! - pairs that match no field are skipped
//! - a repeated name overwrites the earlier value
//! - a value that cannot be read as the field's type is an [`Error::Format`]

pub mod codec;
pub mod converters;
pub mod de;
pub mod descriptor;
pub mod error;
pub mod macros;
pub mod options;
pub mod pair;
pub mod ser;
pub mod value;

pub use converters::{FnConverter, Iso8601Converter, TicksConverter, ValueConverter};
pub use de::Deserializer;
pub use descriptor::{FieldAttributes, FieldDescriptor, FieldTable, FormRecord};
pub use error::{Error, Result};
pub use options::{DeserializeOptions, EnumHandling, SerializeOptions};
pub use pair::WirePair;
pub use ser::{to_value, Serializer};
pub use value::{FormValue, Number};

use serde::de::DeserializeOwned;
use std::io;
use tracing::debug;

/// Serialize a record to a form URL encoded string with default options.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_form::{to_string, FormRecord};
///
/// #[derive(Serialize, Default)]
/// struct Point { x: i32, y: i32 }
///
/// impl FormRecord for Point {}
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), "x=1&y=2");
/// ```
///
/// # Errors
///
/// Returns an error if the record is not a flat struct, or a converter fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(record: &T) -> Result<String>
where
    T: FormRecord,
{
    to_string_with_options(record, &SerializeOptions::default())
}

/// Serialize a record to a form URL encoded string with custom options.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_form::{to_string_with_options, FormRecord, SerializeOptions};
///
/// #[derive(Serialize, Default)]
/// struct Query { q: String, page: u32 }
///
/// impl FormRecord for Query {}
///
/// let query = Query { q: "a b".to_string(), page: 0 };
/// let options = SerializeOptions::new()
///     .with_encode_space_as_plus(false)
///     .with_ignore_if_default(true);
/// assert_eq!(to_string_with_options(&query, &options).unwrap(), "q=a%20b");
/// ```
///
/// # Errors
///
/// Returns an error if the record is not a flat struct, or a converter fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(record: &T, options: &SerializeOptions) -> Result<String>
where
    T: FormRecord,
{
    let table = FieldTable::resolve::<T>()?;
    let mut serializer = Serializer::new(options, &table);
    serializer.write_record(record)?;
    let output = serializer.into_inner();
    debug!(fields = table.len(), bytes = output.len(), "encoded form record");
    Ok(output)
}

/// Serialize a record as form URL encoded text into a writer.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, record: &T) -> Result<()>
where
    W: io::Write,
    T: FormRecord,
{
    to_writer_with_options(writer, record, &SerializeOptions::default())
}

/// Serialize a record as form URL encoded text into a writer with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(
    mut writer: W,
    record: &T,
    options: &SerializeOptions,
) -> Result<()>
where
    W: io::Write,
    T: FormRecord,
{
    let form = to_string_with_options(record, options)?;
    writer
        .write_all(form.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize a record from form URL encoded text with default options.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_form::{from_str, FormRecord};
///
/// #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// impl FormRecord for Point {}
///
/// let point: Point = from_str("y=2&x=1&z=3").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for empty input and [`Error::Format`]
/// when a value cannot be converted to its field's type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(input: &str) -> Result<T>
where
    T: FormRecord + DeserializeOwned,
{
    from_str_with_options(input, &DeserializeOptions::default())
}

/// Deserialize a record from form URL encoded text with custom options.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for empty input and [`Error::Format`]
/// when a value cannot be converted to its field's type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options<T>(input: &str, options: &DeserializeOptions) -> Result<T>
where
    T: FormRecord + DeserializeOwned,
{
    if input.is_empty() {
        return Err(Error::invalid_argument("form URL encoded data was empty"));
    }

    let defaults = ser::record_fields(&T::default())?;
    let table = FieldTable::from_fields(defaults.clone(), T::field_attributes)?;

    let mut deserializer = Deserializer::new(defaults, options);
    deserializer.populate(input, &table, options)?;
    T::deserialize(deserializer)
}

/// Deserialize a record from optional form text, treating `None` like empty input.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for `None` or empty input.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_optional_str<T>(input: Option<&str>, options: &DeserializeOptions) -> Result<T>
where
    T: FormRecord + DeserializeOwned,
{
    match input {
        Some(input) => from_str_with_options(input, options),
        None => Err(Error::invalid_argument("form URL encoded data was absent")),
    }
}

/// Deserialize a record from bytes of form URL encoded text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, or as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: FormRecord + DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::invalid_argument(&e.to_string()))?;
    from_str(s)
}

/// Deserialize a record from an I/O stream of form URL encoded text.
///
/// # Errors
///
/// Returns an error if reading fails, or as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: FormRecord + DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Resolve the field descriptors of a record type, in declaration order.
///
/// # Errors
///
/// Returns an error if `T` is not a flat struct.
pub fn resolve<T>() -> Result<FieldTable>
where
    T: FormRecord,
{
    FieldTable::resolve::<T>()
}

/// Resolve one field of a record type by wire name or native name.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_form::{form_record, resolve_one, FieldAttributes};
///
/// #[derive(Serialize, Default)]
/// struct Contact { email: String }
///
/// form_record!(Contact { "email" => FieldAttributes::renamed("emailAddress") });
///
/// let by_wire = resolve_one::<Contact>("emailAddress").unwrap().unwrap();
/// assert_eq!(by_wire.native_name(), "email");
/// assert!(resolve_one::<Contact>("phone").unwrap().is_none());
/// ```
///
/// # Errors
///
/// Returns an error if `T` is not a flat struct.
pub fn resolve_one<T>(name: &str) -> Result<Option<FieldDescriptor>>
where
    T: FormRecord,
{
    Ok(resolve::<T>()?.resolve_one(name).cloned())
}
