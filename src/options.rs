//! Configuration options for form URL encoded serialization.
//!
//! - [`SerializeOptions`]: percent-encoding and omission rules for encoding
//! - [`DeserializeOptions`]: percent-decoding rules for decoding
//! - [`EnumHandling`]: whether enums travel as ordinals or variant names
//!
//! All option structs are plain values; build them with the `with_*` methods.
//!
//! ## Examples
//!
//! ```rust
//! use serde_form::{EnumHandling, SerializeOptions, DeserializeOptions};
//!
//! let ser = SerializeOptions::new()
//!     .with_encode_space_as_plus(false)
//!     .with_ignore_if_default(true)
//!     .with_enum_handling(EnumHandling::Name);
//! assert!(ser.encode);
//!
//! let de = DeserializeOptions::new().with_enum_handling(EnumHandling::Name);
//! assert!(de.decode_plus_as_space);
//! ```

/// How enum fields are represented on the wire.
///
/// # Examples
///
/// ```rust
/// use serde_form::EnumHandling;
///
/// assert_eq!(EnumHandling::default(), EnumHandling::Number);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EnumHandling {
    /// The variant's declaration index, e.g. `TrafficLight=2`.
    #[default]
    Number,
    /// The variant's name, e.g. `TrafficLight=Yellow`.
    Name,
}

/// Options applied when encoding a record.
///
/// # Examples
///
/// ```rust
/// use serde_form::SerializeOptions;
///
/// let options = SerializeOptions::default();
/// assert!(options.encode);
/// assert!(options.encode_space_as_plus);
/// assert!(options.ignore_if_null);
/// assert!(!options.ignore_if_default);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Percent-encode names and values.
    pub encode: bool,
    /// Write spaces as `+` instead of `%20`. Only used when `encode` is set.
    pub encode_space_as_plus: bool,
    /// Omit fields whose value is null (`None`).
    pub ignore_if_null: bool,
    /// Omit fields holding their type's default value. Takes priority over
    /// `ignore_if_null`.
    pub ignore_if_default: bool,
    pub enum_handling: EnumHandling,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions {
            encode: true,
            encode_space_as_plus: true,
            ignore_if_null: true,
            ignore_if_default: false,
            enum_handling: EnumHandling::default(),
        }
    }
}

impl SerializeOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that write names and values verbatim.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_form::SerializeOptions;
    ///
    /// assert!(!SerializeOptions::raw().encode);
    /// ```
    #[must_use]
    pub fn raw() -> Self {
        SerializeOptions {
            encode: false,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_encode(mut self, encode: bool) -> Self {
        self.encode = encode;
        self
    }

    #[must_use]
    pub fn with_encode_space_as_plus(mut self, plus: bool) -> Self {
        self.encode_space_as_plus = plus;
        self
    }

    #[must_use]
    pub fn with_ignore_if_null(mut self, ignore: bool) -> Self {
        self.ignore_if_null = ignore;
        self
    }

    #[must_use]
    pub fn with_ignore_if_default(mut self, ignore: bool) -> Self {
        self.ignore_if_default = ignore;
        self
    }

    #[must_use]
    pub fn with_enum_handling(mut self, handling: EnumHandling) -> Self {
        self.enum_handling = handling;
        self
    }
}

/// Options applied when decoding a form string.
///
/// # Examples
///
/// ```rust
/// use serde_form::DeserializeOptions;
///
/// let options = DeserializeOptions::default();
/// assert!(options.decode);
/// assert!(options.decode_plus_as_space);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeserializeOptions {
    /// Percent-decode names and values.
    pub decode: bool,
    /// Treat a literal `+` as a space. Only used when `decode` is set.
    pub decode_plus_as_space: bool,
    pub enum_handling: EnumHandling,
}

impl Default for DeserializeOptions {
    fn default() -> Self {
        DeserializeOptions {
            decode: true,
            decode_plus_as_space: true,
            enum_handling: EnumHandling::default(),
        }
    }
}

impl DeserializeOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that take names and values verbatim.
    #[must_use]
    pub fn raw() -> Self {
        DeserializeOptions {
            decode: false,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_decode(mut self, decode: bool) -> Self {
        self.decode = decode;
        self
    }

    #[must_use]
    pub fn with_decode_plus_as_space(mut self, plus: bool) -> Self {
        self.decode_plus_as_space = plus;
        self
    }

    #[must_use]
    pub fn with_enum_handling(mut self, handling: EnumHandling) -> Self {
        self.enum_handling = handling;
        self
    }
}
