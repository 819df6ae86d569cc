//! Field metadata resolution.
//!
//! A [`FieldTable`] lists the serializable fields of a record type in
//! declaration order, each with its wire name, converter and sequence flag.
//! Fields are discovered by serializing `T::default()`, and per-field
//! metadata comes from [`FormRecord::field_attributes`].
//!
//! ```rust
//! use serde::Serialize;
//! use serde_form::{form_record, resolve, FieldAttributes};
//!
//! #[derive(Serialize, Default)]
//! struct Contact {
//!     name: String,
//!     email: String,
//!     notes: Vec<String>,
//!     internal_id: u64,
//! }
//!
//! form_record!(Contact {
//!     "email" => FieldAttributes::renamed("emailAddress"),
//!     "internal_id" => FieldAttributes::ignored(),
//! });
//!
//! let table = resolve::<Contact>().unwrap();
//! let wire: Vec<_> = table.iter().map(|d| d.wire_name()).collect();
//! assert_eq!(wire, ["name", "emailAddress", "notes"]);
//! assert!(table.get("notes").unwrap().is_sequence());
//! ```

use crate::ser::{nested_without_converter, record_fields};
use crate::{FormValue, Result, ValueConverter};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A record type that can be written to and read from form data.
///
/// Implement it (or use [`form_record!`](crate::form_record)) for every
/// record type. The default implementation declares no field metadata, so
/// every field travels under its serde name.
pub trait FormRecord: Serialize + Default {
    /// Returns the metadata declared for the field named `field`.
    fn field_attributes(field: &str) -> FieldAttributes {
        let _ = field;
        FieldAttributes::default()
    }
}

/// Declarative metadata for one field.
///
/// # Examples
///
/// ```rust
/// use serde_form::{FieldAttributes, Iso8601Converter};
///
/// let attrs = FieldAttributes::renamed("created").with_converter(Iso8601Converter);
/// assert_eq!(attrs.rename.as_deref(), Some("created"));
/// assert!(attrs.converter.is_some());
/// ```
#[derive(Clone, Default)]
pub struct FieldAttributes {
    /// Wire name override. `None` or an empty string keeps the field name.
    pub rename: Option<String>,
    /// Leave the field out of both encoding and decoding.
    pub ignore: bool,
    pub converter: Option<Arc<dyn ValueConverter>>,
}

impl FieldAttributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn renamed(name: &str) -> Self {
        Self::new().with_rename(name)
    }

    #[must_use]
    pub fn ignored() -> Self {
        FieldAttributes {
            ignore: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_rename(mut self, name: &str) -> Self {
        self.rename = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn with_converter<C>(mut self, converter: C) -> Self
    where
        C: ValueConverter + 'static,
    {
        self.converter = Some(Arc::new(converter));
        self
    }
}

impl fmt::Debug for FieldAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAttributes")
            .field("rename", &self.rename)
            .field("ignore", &self.ignore)
            .field("converter", &self.converter.is_some())
            .finish()
    }
}

/// Resolved metadata for one field.
#[derive(Clone)]
pub struct FieldDescriptor {
    native_name: &'static str,
    wire_name: String,
    ignored: bool,
    converter: Option<Arc<dyn ValueConverter>>,
    is_sequence: bool,
}

impl FieldDescriptor {
    /// Builds a descriptor from a field's name, its metadata, and a sample
    /// value used to detect sequence fields.
    #[must_use]
    pub fn new(native_name: &'static str, attributes: FieldAttributes, sample: &FormValue) -> Self {
        let wire_name = match attributes.rename {
            Some(rename) if !rename.is_empty() => rename,
            _ => native_name.to_string(),
        };

        FieldDescriptor {
            native_name,
            wire_name,
            ignored: attributes.ignore,
            converter: attributes.converter,
            is_sequence: sample.is_sequence(),
        }
    }

    /// The field name as serde sees it.
    #[must_use]
    pub fn native_name(&self) -> &'static str {
        self.native_name
    }

    #[must_use]
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    #[must_use]
    pub fn converter(&self) -> Option<&dyn ValueConverter> {
        self.converter.as_deref()
    }

    #[must_use]
    pub fn is_sequence(&self) -> bool {
        self.is_sequence
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("native_name", &self.native_name)
            .field("wire_name", &self.wire_name)
            .field("ignored", &self.ignored)
            .field("converter", &self.converter.is_some())
            .field("is_sequence", &self.is_sequence)
            .finish()
    }
}

/// The ordered descriptors of a record type, keyed by native name.
///
/// Ignored fields are not part of the table. A table is immutable once
/// built and can be shared between threads.
#[derive(Clone, Debug, Default)]
pub struct FieldTable {
    fields: IndexMap<&'static str, FieldDescriptor>,
}

impl FieldTable {
    /// Resolves the fields of `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if `T::default()` does not serialize as a struct, or
    /// a field that is neither ignored nor bound to a converter holds a
    /// nested struct, map or data-carrying variant.
    pub fn resolve<T: FormRecord>() -> Result<Self> {
        let sample = T::default();
        let fields = record_fields(&sample)?;
        Self::from_fields(fields, T::field_attributes)
    }

    pub(crate) fn from_fields<F>(
        fields: Vec<(&'static str, FormValue)>,
        attributes: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> FieldAttributes,
    {
        let mut table = IndexMap::with_capacity(fields.len());

        for (name, sample) in fields {
            let descriptor = FieldDescriptor::new(name, attributes(name), &sample);
            if descriptor.is_ignored() {
                trace!(field = name, "ignoring field");
                continue;
            }
            if descriptor.converter.is_none() && !sample.is_flat() {
                return Err(nested_without_converter(name));
            }
            table.insert(name, descriptor);
        }

        Ok(FieldTable { fields: table })
    }

    /// Looks up a descriptor by native name.
    #[must_use]
    pub fn get(&self, native_name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(native_name)
    }

    /// Looks up a descriptor by exact, case-sensitive wire name.
    #[must_use]
    pub fn by_wire_name(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        self.fields.values().find(|d| d.wire_name == wire_name)
    }

    /// Looks up a descriptor by wire name, then by native name.
    #[must_use]
    pub fn resolve_one(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_wire_name(name).or_else(|| self.get(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::Iso8601Converter;

    fn sample_fields() -> Vec<(&'static str, FormValue)> {
        vec![
            ("name", FormValue::from("")),
            ("email", FormValue::from("")),
            ("tags", FormValue::Sequence(vec![])),
            ("created", FormValue::from("1970-01-01T00:00:00Z")),
            ("secret", FormValue::from("")),
        ]
    }

    fn attributes(field: &str) -> FieldAttributes {
        match field {
            "email" => FieldAttributes::renamed("emailAddress"),
            "name" => FieldAttributes::renamed(""),
            "created" => FieldAttributes::new().with_converter(Iso8601Converter),
            "secret" => FieldAttributes::ignored(),
            _ => FieldAttributes::default(),
        }
    }

    #[test]
    fn test_table_keeps_declaration_order() {
        let table = FieldTable::from_fields(sample_fields(), attributes).unwrap();
        let names: Vec<_> = table.iter().map(FieldDescriptor::native_name).collect();
        assert_eq!(names, ["name", "email", "tags", "created"]);
    }

    #[test]
    fn test_empty_rename_falls_back_to_native_name() {
        let table = FieldTable::from_fields(sample_fields(), attributes).unwrap();
        assert_eq!(table.get("name").unwrap().wire_name(), "name");
    }

    #[test]
    fn test_ignored_fields_are_excluded() {
        let table = FieldTable::from_fields(sample_fields(), attributes).unwrap();
        assert!(table.get("secret").is_none());
        assert!(table.resolve_one("secret").is_none());
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_resolve_one_by_wire_or_native_name() {
        let table = FieldTable::from_fields(sample_fields(), attributes).unwrap();
        assert_eq!(
            table.resolve_one("emailAddress").unwrap().native_name(),
            "email"
        );
        assert_eq!(table.resolve_one("email").unwrap().native_name(), "email");
        assert!(table.resolve_one("EmailAddress").is_none());
    }

    #[test]
    fn test_nested_sample_needs_converter_unless_ignored() {
        let nested = FormValue::Record(vec![("r".to_string(), FormValue::from(0u8))]);
        let fields = vec![("name", FormValue::from("")), ("color", nested)];

        let err = FieldTable::from_fields(fields.clone(), |_| FieldAttributes::default())
            .unwrap_err();
        assert!(matches!(err, crate::Error::UnsupportedType(ref msg) if msg.contains("color")));

        let table = FieldTable::from_fields(fields.clone(), |field| match field {
            "color" => FieldAttributes::ignored(),
            _ => FieldAttributes::default(),
        })
        .unwrap();
        assert_eq!(table.len(), 1);

        let table = FieldTable::from_fields(fields, |field| match field {
            "color" => FieldAttributes::new().with_converter(Iso8601Converter),
            _ => FieldAttributes::default(),
        })
        .unwrap();
        assert!(table.get("color").unwrap().converter().is_some());
    }

    #[test]
    fn test_sequence_and_converter_flags() {
        let table = FieldTable::from_fields(sample_fields(), attributes).unwrap();
        assert!(table.get("tags").unwrap().is_sequence());
        assert!(!table.get("name").unwrap().is_sequence());
        assert!(table.get("created").unwrap().converter().is_some());
        assert!(table.get("tags").unwrap().converter().is_none());
    }
}
