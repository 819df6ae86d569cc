//! Property-based tests for the round-trip guarantees of the form codec.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_form::{
    codec, from_str, from_str_with_options, to_string, to_string_with_options,
    DeserializeOptions, EnumHandling, FormRecord, SerializeOptions,
};

#[derive(Serialize, Deserialize, Debug, PartialEq, Default, Clone)]
struct Strings {
    first: String,
    second: String,
}

impl FormRecord for Strings {}

#[derive(Serialize, Deserialize, Debug, PartialEq, Default, Clone)]
struct Scalars {
    flag: bool,
    small: i8,
    count: u32,
    total: i64,
    ratio: f64,
    letter: char,
}

impl FormRecord for Scalars {}

#[derive(Serialize, Deserialize, Debug, PartialEq, Default, Clone)]
struct Listing {
    items: Vec<String>,
    numbers: Vec<u16>,
}

impl FormRecord for Listing {}

#[derive(Serialize, Deserialize, Debug, PartialEq, Default, Clone, Copy)]
enum Light {
    #[default]
    Red,
    Amber,
    Green,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Default, Clone)]
struct Junction {
    light: Light,
}

impl FormRecord for Junction {}

fn roundtrip<T>(value: &T) -> bool
where
    T: FormRecord + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug,
{
    match to_string(value) {
        Ok(serialized) if serialized.is_empty() => true,
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn light() -> impl Strategy<Value = Light> {
    prop_oneof![Just(Light::Red), Just(Light::Amber), Just(Light::Green)]
}

proptest! {
    #[test]
    fn prop_any_strings_roundtrip(first in ".*", second in ".*") {
        let value = Strings { first, second };
        prop_assert!(roundtrip(&value));
    }

    #[test]
    fn prop_unreserved_strings_roundtrip(first in "[A-Za-z0-9._~-]{1,20}", second in "[a-z ]{1,20}") {
        let value = Strings { first, second };
        prop_assert!(roundtrip(&value));
    }

    #[test]
    fn prop_scalars_roundtrip(
        flag in any::<bool>(),
        small in any::<i8>(),
        count in any::<u32>(),
        total in any::<i64>(),
        ratio in -1.0e9f64..1.0e9,
        letter in any::<char>(),
    ) {
        let value = Scalars { flag, small, count, total, ratio, letter };
        prop_assert!(roundtrip(&value));
    }

    #[test]
    fn prop_sequences_roundtrip(
        items in prop::collection::vec("[a-zA-Z0-9 &=+%]{1,8}", 1..6),
        numbers in prop::collection::vec(any::<u16>(), 1..6),
    ) {
        let value = Listing { items, numbers };
        prop_assert!(roundtrip(&value));
    }

    #[test]
    fn prop_enum_roundtrip_in_both_modes(light in light(), by_name in any::<bool>()) {
        let handling = if by_name { EnumHandling::Name } else { EnumHandling::Number };
        let record = Junction { light };

        let form = to_string_with_options(
            &record,
            &SerializeOptions::new().with_enum_handling(handling),
        ).unwrap();
        let back: Junction = from_str_with_options(
            &form,
            &DeserializeOptions::new().with_enum_handling(handling),
        ).unwrap();
        prop_assert_eq!(back, record);
    }

    #[test]
    fn prop_codec_roundtrip(value in ".*", plus in any::<bool>()) {
        let ser = SerializeOptions::new().with_encode_space_as_plus(plus);
        let de = DeserializeOptions::new();
        let encoded = codec::encode(&value, &ser, true);
        prop_assert!(!encoded.contains(' '));
        prop_assert!(!encoded.contains('&'));
        prop_assert!(!encoded.contains('='));
        prop_assert_eq!(codec::decode(&encoded, &de), value);
    }

    #[test]
    fn prop_last_write_wins(values in prop::collection::vec("[a-z]{1,8}", 1..5)) {
        let form = values
            .iter()
            .map(|v| format!("first={}", v))
            .collect::<Vec<_>>()
            .join("&");
        let record: Strings = from_str(&form).unwrap();
        prop_assert_eq!(&record.first, values.last().unwrap());
    }
}
