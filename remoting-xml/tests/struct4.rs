//! Self-referential composites through XML.

use std::sync::Arc;

use indoc::indoc;
use remoting::{Codec, DeserializeError, Reference};
use remoting_xml::{XmlErrorKind, from_str, to_string, to_string_pretty};

#[derive(Codec, Debug, Clone, PartialEq)]
struct Struct4 {
    #[remoting(namespace = "urn:x")]
    ptr: Reference<Struct4>,
    value: String,
    vec: Vec<Struct4>,
}

impl Struct4 {
    fn leaf(value: &str) -> Self {
        Struct4 {
            ptr: None,
            value: value.into(),
            vec: Vec::new(),
        }
    }

    fn sample() -> Self {
        Struct4 {
            ptr: Some(Arc::new(Struct4::leaf("inner"))),
            value: "outer".into(),
            vec: vec![Struct4::leaf("child")],
        }
    }
}

#[remoting_testhelpers::test]
fn namespace_is_declared_where_it_changes() {
    let xml = to_string_pretty("Struct4", &Struct4::sample()).unwrap();
    insta::assert_snapshot!(xml, @r#"
    <Struct4>
      <ptr xmlns="urn:x">
        <ptr nil="true"/>
        <value>inner</value>
        <vec></vec>
      </ptr>
      <value>outer</value>
      <vec>
        <item>
          <ptr xmlns="urn:x" nil="true"/>
          <value>child</value>
          <vec></vec>
        </item>
      </vec>
    </Struct4>
    "#);
}

#[remoting_testhelpers::test]
fn compact_and_pretty_output_read_back() {
    let value = Struct4::sample();
    let compact = to_string("Struct4", &value).unwrap();
    let pretty = to_string_pretty("Struct4", &value).unwrap();
    assert_eq!(from_str::<Struct4>("Struct4", &compact).unwrap(), value);
    assert_eq!(from_str::<Struct4>("Struct4", &pretty).unwrap(), value);
}

#[remoting_testhelpers::test]
fn empty_reference_round_trips() {
    let xml = to_string("Struct4", &Struct4::leaf("alone")).unwrap();
    assert_eq!(
        xml,
        r#"<Struct4><ptr xmlns="urn:x" nil="true"/><value>alone</value><vec></vec></Struct4>"#
    );
    let back: Struct4 = from_str("Struct4", &xml).unwrap();
    assert!(back.ptr.is_none());
}

#[remoting_testhelpers::test]
fn prefixed_documents_resolve_to_the_same_namespace() {
    let xml = indoc! {r#"
        <?xml version="1.0"?>
        <Struct4 xmlns:x="urn:x">
          <!-- prefixes are resolved, not compared -->
          <x:ptr nil="true"/>
          <value>  spaced  </value>
          <vec/>
        </Struct4>
    "#};
    let back: Struct4 = from_str("Struct4", xml).unwrap();
    assert_eq!(back.value, "  spaced  ");
    assert!(back.ptr.is_none());
    assert!(back.vec.is_empty());
}

#[remoting_testhelpers::test]
fn unqualified_reference_is_rejected() {
    let xml = r#"<Struct4><ptr nil="true"/><value>v</value><vec/></Struct4>"#;
    match from_str::<Struct4>("Struct4", xml).unwrap_err() {
        DeserializeError::Backend(err) => {
            assert_eq!(
                err.kind(),
                &XmlErrorKind::NamespaceMismatch {
                    expected: Some("urn:x".into()),
                    got: None,
                }
            );
            assert_eq!(err.position(), Some(9));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[remoting_testhelpers::test]
fn missing_field_is_a_protocol_mismatch() {
    let xml = r#"<Struct4><ptr xmlns="urn:x" nil="true"/><vec/></Struct4>"#;
    match from_str::<Struct4>("Struct4", xml).unwrap_err() {
        DeserializeError::ProtocolMismatch { expected, got, path } => {
            assert_eq!(expected, "string scalar `value`");
            assert_eq!(got, "scalar `vec` = \"\"");
            assert_eq!(path.to_string(), "Struct4.value");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[remoting_testhelpers::test]
fn nil_where_a_value_is_required_is_an_unexpected_absence() {
    let xml = r#"<Struct4><ptr xmlns="urn:x" nil="true"/><value nil="true"/><vec/></Struct4>"#;
    match from_str::<Struct4>("Struct4", xml).unwrap_err() {
        DeserializeError::UnexpectedAbsence { name, .. } => assert_eq!(name, "value"),
        other => panic!("unexpected error {other}"),
    }
}

#[remoting_testhelpers::test]
fn thousand_levels_deep_round_trips() {
    let mut value = Struct4::leaf("bottom");
    for level in 0..1000 {
        value = Struct4 {
            ptr: None,
            value: format!("level {level}"),
            vec: vec![value],
        };
    }
    let xml = to_string("Struct4", &value).unwrap();
    let back: Struct4 = from_str("Struct4", &xml).unwrap();
    assert_eq!(back, value);
}

#[remoting_testhelpers::test]
fn document_cut_short_is_truncated_input() {
    let full = to_string("Struct4", &Struct4::leaf("ab")).unwrap();
    let inside_text = &full[..full.find("ab<").unwrap() + 1];
    let inside_tag = &full[..full.find("<value").unwrap() + 4];
    for cut in [inside_text, inside_tag] {
        match from_str::<Struct4>("Struct4", cut).unwrap_err() {
            DeserializeError::TruncatedInput { expected, path } => {
                assert_eq!(expected, "string scalar `value`", "{cut}");
                assert_eq!(path.to_string(), "Struct4.value");
            }
            other => panic!("unexpected error {other} for {cut}"),
        }
    }

    match from_str::<Vec<String>>("v", "<v><item>abc").unwrap_err() {
        DeserializeError::TruncatedInput { expected, .. } => {
            assert_eq!(expected, "sequence-end `v`");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[derive(Codec, Debug, Clone, PartialEq)]
struct Nested {
    maybe: Option<Option<String>>,
    boxed: Option<Box<Option<u8>>>,
    list: Vec<Option<Option<i32>>>,
}

#[remoting_testhelpers::test]
fn references_holding_references_round_trip() {
    let cases = [
        Nested {
            maybe: Some(None),
            boxed: Some(Box::new(None)),
            list: vec![None, Some(None), Some(Some(-1))],
        },
        Nested {
            maybe: None,
            boxed: None,
            list: vec![],
        },
        Nested {
            maybe: Some(Some(String::new())),
            boxed: Some(Box::new(Some(0))),
            list: vec![Some(None)],
        },
    ];
    for value in cases {
        let xml = to_string("Nested", &value).unwrap();
        let back: Nested = from_str("Nested", &xml).unwrap();
        assert_eq!(back, value, "{xml}");
    }

    let xml = to_string(
        "Nested",
        &Nested {
            maybe: Some(None),
            boxed: None,
            list: vec![],
        },
    )
    .unwrap();
    assert_eq!(
        xml,
        r#"<Nested><maybe present="1" nil="true"/><boxed nil="true"/><list></list></Nested>"#
    );
}
