/// Implements [`FormRecord`](crate::FormRecord) for a type, optionally with
/// per-field metadata.
///
/// Field names are the names serde uses for the fields. Fields not listed
/// travel under their own name.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_form::{form_record, to_string, FieldAttributes};
///
/// #[derive(Serialize, Deserialize, Default)]
/// struct Plain { id: u32 }
///
/// form_record!(Plain);
///
/// #[derive(Serialize, Deserialize, Default)]
/// struct Signup {
///     name: String,
///     email: String,
///     password: String,
/// }
///
/// form_record!(Signup {
///     "email" => FieldAttributes::renamed("emailAddress"),
///     "password" => FieldAttributes::ignored(),
/// });
///
/// let signup = Signup {
///     name: "John".into(),
///     email: "john@example.com".into(),
///     password: "hunter2".into(),
/// };
/// assert_eq!(to_string(&signup).unwrap(), "name=John&emailAddress=john%40example.com");
/// ```
#[macro_export]
macro_rules! form_record {
    ($ty:ty { $($field:literal => $attributes:expr),* $(,)? }) => {
        impl $crate::FormRecord for $ty {
            fn field_attributes(field: &str) -> $crate::FieldAttributes {
                match field {
                    $($field => $attributes,)*
                    _ => $crate::FieldAttributes::default(),
                }
            }
        }
    };

    ($ty:ty) => {
        impl $crate::FormRecord for $ty {}
    };
}
