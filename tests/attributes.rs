use serde::{Deserialize, Serialize};
use serde_form::{
    form_record, from_str, resolve, resolve_one, to_string, Error, FieldAttributes, FormRecord,
};

#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
struct Renamed {
    name: Option<String>,
    email: Option<String>,
    items: Vec<String>,
}

form_record!(Renamed {
    "email" => FieldAttributes::renamed("emailAddress"),
    "items" => FieldAttributes::renamed("itemList"),
});

#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
struct EmptyRename {
    email: Option<String>,
}

form_record!(EmptyRename {
    "email" => FieldAttributes::renamed(""),
});

#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
struct Ignored {
    name: Option<String>,
    email: Option<String>,
    age: u32,
}

form_record!(Ignored {
    "email" => FieldAttributes::ignored(),
    "age" => FieldAttributes::ignored(),
});

#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
struct IgnoredAndRenamed {
    name: Option<String>,
    email: Option<String>,
}

form_record!(IgnoredAndRenamed {
    "email" => FieldAttributes::ignored().with_rename("emailAddress"),
});

#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
struct Bracketed {
    search: String,
}

form_record!(Bracketed {
    "search" => FieldAttributes::renamed("q[text]"),
});

#[derive(Serialize, Deserialize, Debug, PartialEq, Default, Clone)]
struct Audit {
    created_by: String,
    revision: u32,
    labels: std::collections::BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
struct WithAudit {
    name: String,
    audit: Audit,
}

form_record!(WithAudit {
    "audit" => FieldAttributes::ignored(),
});

#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
struct WithUnignoredAudit {
    name: String,
    audit: Audit,
}

impl FormRecord for WithUnignoredAudit {}

#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
struct SerdeRenamed {
    #[serde(rename = "Email")]
    email: String,
    #[serde(skip)]
    cache: Vec<u8>,
}

impl FormRecord for SerdeRenamed {}

#[test]
fn test_rename_on_encode() {
    let record = Renamed {
        name: Some("John".to_string()),
        email: Some("john@somewhere.com".to_string()),
        items: vec![],
    };
    assert_eq!(
        to_string(&record).unwrap(),
        "name=John&emailAddress=john%40somewhere.com&itemList="
    );
}

#[test]
fn test_rename_on_decode() {
    let record: Renamed = from_str("name=John&emailAddress=somewhere").unwrap();
    assert_eq!(record.name.as_deref(), Some("John"));
    assert_eq!(record.email.as_deref(), Some("somewhere"));
}

#[test]
fn test_renamed_sequence_on_decode() {
    let record: Renamed = from_str("itemList=John,Peter").unwrap();
    assert_eq!(record.items, ["John", "Peter"]);
}

#[test]
fn test_wire_names_are_case_sensitive() {
    let record: Renamed = from_str("EmailAddress=somewhere").unwrap();
    assert_eq!(record.email, None);
}

#[test]
fn test_empty_rename_falls_back_to_field_name() {
    let record = EmptyRename {
        email: Some("somewhere".to_string()),
    };
    assert_eq!(to_string(&record).unwrap(), "email=somewhere");
    assert_eq!(from_str::<EmptyRename>("email=somewhere").unwrap(), record);
}

#[test]
fn test_ignored_fields_are_not_written() {
    let record = Ignored {
        name: Some("John".to_string()),
        email: Some("john@somewhere.com".to_string()),
        age: 50,
    };
    assert_eq!(to_string(&record).unwrap(), "name=John");
}

#[test]
fn test_ignored_fields_are_not_read() {
    let record: Ignored = from_str("name=John&email=somewhere&age=50").unwrap();
    assert_eq!(
        record,
        Ignored {
            name: Some("John".to_string()),
            email: None,
            age: 0,
        }
    );
}

#[test]
fn test_ignore_wins_over_rename() {
    let record: IgnoredAndRenamed = from_str("name=John&emailAddress=somewhere").unwrap();
    assert_eq!(record.name.as_deref(), Some("John"));
    assert_eq!(record.email, None);

    let record = IgnoredAndRenamed {
        name: None,
        email: Some("somewhere".to_string()),
    };
    assert_eq!(to_string(&record).unwrap(), "");
}

#[test]
fn test_reserved_characters_in_wire_names() {
    let record = Bracketed {
        search: "rust forms".to_string(),
    };
    let form = to_string(&record).unwrap();
    assert_eq!(form, "q%5Btext%5D=rust+forms");
    assert_eq!(from_str::<Bracketed>(&form).unwrap(), record);
    assert_eq!(from_str::<Bracketed>("q[text]=rust").unwrap().search, "rust");
}

#[test]
fn test_serde_attributes_are_respected() {
    let record = SerdeRenamed {
        email: "a@b.c".to_string(),
        cache: vec![1, 2],
    };
    assert_eq!(to_string(&record).unwrap(), "Email=a%40b.c");

    let back: SerdeRenamed = from_str("Email=x&cache=1,2").unwrap();
    assert_eq!(back.email, "x");
    assert!(back.cache.is_empty());
}

#[test]
fn test_resolve_lists_descriptors_in_order() {
    let table = resolve::<Ignored>().unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.iter().next().unwrap().wire_name(), "name");

    let table = resolve::<Renamed>().unwrap();
    let wire: Vec<_> = table.iter().map(|d| d.wire_name().to_string()).collect();
    assert_eq!(wire, ["name", "emailAddress", "itemList"]);
    assert!(table.get("items").unwrap().is_sequence());
}

#[test]
fn test_resolve_one() {
    let by_wire = resolve_one::<Renamed>("emailAddress").unwrap().unwrap();
    assert_eq!(by_wire.native_name(), "email");

    let by_native = resolve_one::<Renamed>("email").unwrap().unwrap();
    assert_eq!(by_native.wire_name(), "emailAddress");

    assert!(resolve_one::<Ignored>("age").unwrap().is_none());
    assert!(resolve_one::<Renamed>("missing").unwrap().is_none());
}

#[test]
fn test_ignored_nested_field_is_not_written() {
    let mut labels = std::collections::BTreeMap::new();
    labels.insert("team".to_string(), "billing".to_string());
    let record = WithAudit {
        name: "invoice".to_string(),
        audit: Audit {
            created_by: "alice".to_string(),
            revision: 3,
            labels,
        },
    };
    assert_eq!(to_string(&record).unwrap(), "name=invoice");
}

#[test]
fn test_ignored_nested_field_keeps_default_on_decode() {
    let record: WithAudit = from_str("name=invoice&audit=anything&revision=9").unwrap();
    assert_eq!(
        record,
        WithAudit {
            name: "invoice".to_string(),
            audit: Audit::default(),
        }
    );
    assert!(resolve_one::<WithAudit>("audit").unwrap().is_none());
    assert_eq!(resolve::<WithAudit>().unwrap().len(), 1);
}

#[test]
fn test_nested_field_without_metadata_is_rejected() {
    match to_string(&WithUnignoredAudit::default()) {
        Err(Error::UnsupportedType(msg)) => assert!(msg.contains("audit"), "{}", msg),
        other => panic!("expected an unsupported type error, got {:?}", other),
    }
    assert!(matches!(
        from_str::<WithUnignoredAudit>("name=x"),
        Err(Error::UnsupportedType(_))
    ));
}
