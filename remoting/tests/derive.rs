//! What `#[derive(Codec)]` generates.

use std::collections::VecDeque;
use std::rc::Rc;

use remoting::{Codec, Composite, EventWriter, Field};

#[derive(Codec, Debug, PartialEq)]
struct Inner {
    #[remoting(namespace = "urn:b")]
    deep: u8,
    plain: i16,
}

#[derive(Codec, Debug, PartialEq)]
struct Outer {
    #[remoting(namespace = "urn:a")]
    inner: Inner,
    #[remoting(rename = "kind")]
    r#type: char,
    r#match: bool,
}

#[derive(Codec, Debug, PartialEq)]
struct Marker;

#[derive(Codec, Debug, PartialEq)]
pub(crate) struct Mixed {
    boxed: Box<f32>,
    shared: Rc<String>,
    queue: VecDeque<Option<u64>>,
    marker: Marker,
}

#[remoting_testhelpers::test]
fn field_table_follows_declaration_order() {
    assert_eq!(
        Outer::FIELDS,
        &[
            Field::namespaced("inner", "urn:a"),
            Field::new("kind"),
            Field::new("match"),
        ]
    );
    assert_eq!(
        Inner::FIELDS,
        &[Field::namespaced("deep", "urn:b"), Field::new("plain")]
    );
    assert!(Marker::FIELDS.is_empty());
}

#[remoting_testhelpers::test]
fn nested_namespaces_in_xml() {
    let value = Outer {
        inner: Inner { deep: 1, plain: -2 },
        r#type: 'λ',
        r#match: true,
    };
    let xml = remoting_xml::to_string("Outer", &value).unwrap();
    insta::assert_snapshot!(xml, @r#"<Outer><inner xmlns="urn:a"><deep xmlns="urn:b">1</deep><plain>-2</plain></inner><kind>λ</kind><match>true</match></Outer>"#);
    assert_eq!(remoting_xml::from_str::<Outer>("Outer", &xml).unwrap(), value);
}

#[remoting_testhelpers::test]
fn nested_namespaces_in_events() {
    let value = Outer {
        inner: Inner { deep: 1, plain: -2 },
        r#type: 'k',
        r#match: false,
    };
    let mut writer = EventWriter::new();
    remoting::serialize("Outer", &value, &mut writer).unwrap();
    let namespaces: Vec<Option<&str>> = writer
        .recorded()
        .iter()
        .map(|r| r.namespace.as_deref())
        .collect();
    assert_eq!(
        namespaces,
        [
            None,            // struct-begin Outer
            Some("urn:a"),   // struct-begin inner
            Some("urn:b"),   // deep
            Some("urn:a"),   // plain
            Some("urn:a"),   // struct-end inner
            None,            // kind
            None,            // match
            None,            // struct-end Outer
        ]
    );
}

#[remoting_testhelpers::test]
fn pointers_queues_and_unit_structs_round_trip() {
    let value = Mixed {
        boxed: Box::new(0.25),
        shared: Rc::new("shared".into()),
        queue: VecDeque::from([Some(1), None, Some(u64::MAX)]),
        marker: Marker,
    };

    let bytes = remoting_binary::to_vec("Mixed", &value).unwrap();
    assert_eq!(remoting_binary::from_slice::<Mixed>("Mixed", &bytes).unwrap(), value);

    let xml = remoting_xml::to_string("Mixed", &value).unwrap();
    assert_eq!(
        xml,
        concat!(
            "<Mixed><boxed>0.25</boxed><shared>shared</shared>",
            r#"<queue><item>1</item><item nil="true"/><item>18446744073709551615</item></queue>"#,
            "<marker></marker></Mixed>"
        )
    );
    assert_eq!(remoting_xml::from_str::<Mixed>("Mixed", &xml).unwrap(), value);
}
