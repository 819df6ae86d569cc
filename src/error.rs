//! Error types for form URL encoded serialization and deserialization.
//!
//! ## Error Categories
//!
//! - **Argument errors**: the input cannot be processed at all (empty wire string)
//! - **Format errors**: a decoded value could not be coerced into its field's type
//! - **Unsupported types**: the record is not a flat structure of scalars and sequences
//! - **I/O errors**: reader/writer failures in the streaming helpers
//!
//! Unmatched and ignored fields are never errors; they are skipped.
//!
//! ## Examples
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_form::{from_str, Error, FormRecord};
//!
//! #[derive(Debug, Serialize, Deserialize, Default)]
//! struct Query { page: u32 }
//!
//! impl FormRecord for Query {}
//!
//! let err = from_str::<Query>("page=ten").unwrap_err();
//! assert!(matches!(err, Error::Format { .. }));
//! assert!(err.to_string().contains("page"));
//! ```

use std::fmt;
use thiserror::Error;

/// All errors that can occur while encoding or decoding form data.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The caller supplied input that cannot be processed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A value could not be converted into the field's declared type
    #[error("Cannot convert value '{value}' for field '{field}': {message}")]
    Format {
        field: String,
        value: String,
        message: String,
    },

    /// Unsupported type for serialization
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an argument error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_form::Error;
    ///
    /// let err = Error::invalid_argument("form data was empty");
    /// assert!(err.to_string().contains("form data was empty"));
    /// ```
    pub fn invalid_argument(msg: &str) -> Self {
        Error::InvalidArgument(msg.to_string())
    }

    /// Creates a format error for a field whose raw value could not be converted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_form::Error;
    ///
    /// let err = Error::format("Int", "abc", "invalid digit found in string");
    /// assert!(err.to_string().contains("'abc'"));
    /// assert!(err.to_string().contains("'Int'"));
    /// ```
    pub fn format<M: fmt::Display>(field: &str, value: &str, message: M) -> Self {
        Error::Format {
            field: field.to_string(),
            value: value.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates an unsupported type error for shapes that cannot live in a flat form.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Attaches field context to an error raised while coercing `value`.
    ///
    /// Errors that already carry a field (or are not conversion failures)
    /// pass through unchanged.
    pub(crate) fn for_field(self, field: &str, value: &str) -> Self {
        match self {
            Error::Custom(message) => Error::format(field, value, message),
            other => other,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_field_wraps_custom_errors() {
        let err = Error::custom("invalid digit").for_field("Int", "x1");
        assert_eq!(err, Error::format("Int", "x1", "invalid digit"));
    }

    #[test]
    fn test_for_field_keeps_existing_context() {
        let original = Error::format("Color", "zz", "not hex");
        let err = original.clone().for_field("Other", "yy");
        assert_eq!(err, original);
    }
}
