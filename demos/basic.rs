//! Encoding and decoding a sign-up form.
//!
//! Run with: cargo run --example basic

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_form::{
    form_record, from_str_with_options, to_string, to_string_with_options, DeserializeOptions,
    EnumHandling, FieldAttributes, Iso8601Converter, SerializeOptions,
};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq, Default, Clone, Copy)]
enum Plan {
    #[default]
    Free,
    Team,
    Enterprise,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Default)]
struct Signup {
    name: String,
    email: String,
    plan: Plan,
    interests: Vec<String>,
    referrer: Option<String>,
    signed_up: DateTime<Utc>,
    password_hash: String,
}

form_record!(Signup {
    "email" => FieldAttributes::renamed("emailAddress"),
    "signed_up" => FieldAttributes::renamed("signedUp").with_converter(Iso8601Converter),
    "password_hash" => FieldAttributes::ignored(),
});

fn main() -> Result<(), Box<dyn Error>> {
    let signup = Signup {
        name: "Alice Johnson".to_string(),
        email: "alice@example.com".to_string(),
        plan: Plan::Team,
        interests: vec!["rust".to_string(), "web forms".to_string()],
        referrer: None,
        signed_up: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
        password_hash: "never on the wire".to_string(),
    };

    let form = to_string(&signup)?;
    println!("Default options:\n{}\n", form);

    let ser = SerializeOptions::new()
        .with_encode_space_as_plus(false)
        .with_enum_handling(EnumHandling::Name);
    let de = DeserializeOptions::new().with_enum_handling(EnumHandling::Name);

    let named = to_string_with_options(&signup, &ser)?;
    println!("Enums by name, spaces as %20:\n{}\n", named);

    let back: Signup = from_str_with_options(&named, &de)?;
    assert_eq!(back.plan, Plan::Team);
    assert_eq!(back.interests, signup.interests);
    assert_eq!(back.password_hash, "");
    println!("✓ Round-trip successful (ignored fields keep their defaults)");

    Ok(())
}
