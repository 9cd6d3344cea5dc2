//! A self-referential composite with a hand-written codec, exercised against
//! the in-memory wire variant.

use std::borrow::Cow;
use std::sync::Arc;

use remoting_core::{
    Codec, Composite, DeserializeError, EventReader, EventWriter, Field, Reference,
    SerializeError, WireEvent, WireKind, WireReader, WireWriter, composite,
};

#[derive(Debug, Clone, PartialEq)]
struct Struct4 {
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
}

impl Composite for Struct4 {
    const FIELDS: &'static [Field] = &[
        Field::namespaced("ptr", "urn:x"),
        Field::new("value"),
        Field::new("vec"),
    ];
}

impl Codec for Struct4 {
    const KIND: WireKind = WireKind::Struct;

    fn serialize<W: WireWriter + ?Sized>(
        &self,
        name: &str,
        writer: &mut W,
    ) -> Result<(), SerializeError<W::Error>> {
        let [ptr, value, vec] = Self::FIELDS else {
            unreachable!()
        };
        composite::serialize_struct(name, writer, |writer| {
            composite::serialize_field(writer, ptr, &self.ptr)?;
            composite::serialize_field(writer, value, &self.value)?;
            composite::serialize_field(writer, vec, &self.vec)
        })
    }

    fn deserialize<'de, R: WireReader<'de> + ?Sized>(
        name: &str,
        reader: &mut R,
    ) -> Result<Self, DeserializeError<R::Error>> {
        let [ptr, value, vec] = Self::FIELDS else {
            unreachable!()
        };
        composite::deserialize_struct(name, reader, |reader| {
            Ok(Struct4 {
                ptr: composite::deserialize_field(reader, ptr)?,
                value: composite::deserialize_field(reader, value)?,
                vec: composite::deserialize_field(reader, vec)?,
            })
        })
    }
}

fn round_trip(value: &Struct4) -> Struct4 {
    let mut writer = EventWriter::new();
    remoting_core::serialize("Struct4", value, &mut writer).unwrap();
    let mut reader = EventReader::new(writer.into_events());
    let back = remoting_core::deserialize("Struct4", &mut reader).unwrap();
    assert_eq!(reader.remaining(), 0);
    back
}

#[remoting_testhelpers::test]
fn self_referential_sequences_round_trip() {
    for count in [0, 1, 5] {
        let value = Struct4 {
            ptr: None,
            value: format!("{count} children"),
            vec: (0..count).map(|i| Struct4::leaf(&i.to_string())).collect(),
        };
        assert_eq!(round_trip(&value), value);
    }
}

#[remoting_testhelpers::test]
fn empty_reference_round_trips_to_empty() {
    let value = Struct4::leaf("alone");
    assert!(round_trip(&value).ptr.is_none());
}

#[remoting_testhelpers::test]
fn present_reference_round_trips() {
    let value = Struct4 {
        ptr: Some(Arc::new(Struct4::leaf("pointee"))),
        value: "root".into(),
        vec: vec![Struct4::leaf("child")],
    };
    assert_eq!(round_trip(&value), value);
}

#[remoting_testhelpers::test]
fn only_the_qualified_field_sees_the_namespace() {
    let value = Struct4 {
        ptr: Some(Arc::new(Struct4::leaf("inner"))),
        value: "outer".into(),
        vec: vec![Struct4::leaf("child")],
    };
    let mut writer = EventWriter::new();
    remoting_core::serialize("Struct4", &value, &mut writer).unwrap();

    let seen: Vec<(String, Option<String>)> = writer
        .into_recorded()
        .into_iter()
        .map(|r| (r.event.to_string(), r.namespace))
        .collect();
    let ns = |s: &str| Some(s.to_string());
    let expected = vec![
        ("struct-begin `Struct4`", None),
        ("present `ptr`", ns("urn:x")),
        ("struct-begin `ptr`", ns("urn:x")),
        ("absent `ptr`", ns("urn:x")),
        ("scalar `value` = \"inner\"", ns("urn:x")),
        ("sequence-begin `vec`", ns("urn:x")),
        ("sequence-end `vec`", ns("urn:x")),
        ("struct-end `ptr`", ns("urn:x")),
        ("scalar `value` = \"outer\"", None),
        ("sequence-begin `vec`", None),
        ("struct-begin ``", None),
        ("absent `ptr`", ns("urn:x")),
        ("scalar `value` = \"child\"", None),
        ("sequence-begin `vec`", None),
        ("sequence-end `vec`", None),
        ("struct-end ``", None),
        ("sequence-end `vec`", None),
        ("struct-end `Struct4`", None),
    ];
    let expected: Vec<(String, Option<String>)> = expected
        .into_iter()
        .map(|(event, namespace)| (event.to_string(), namespace))
        .collect();
    assert_eq!(seen, expected);
}

#[remoting_testhelpers::test]
fn construction_order_does_not_change_output() {
    let a = Struct4 {
        ptr: None,
        value: "v".into(),
        vec: vec![Struct4::leaf("x")],
    };
    let mut b = Struct4::leaf("placeholder");
    b.vec.push(Struct4::leaf("x"));
    b.value = "v".into();

    let mut wa = EventWriter::new();
    let mut wb = EventWriter::new();
    remoting_core::serialize("Struct4", &a, &mut wa).unwrap();
    remoting_core::serialize("Struct4", &b, &mut wb).unwrap();
    assert_eq!(wa.into_recorded(), wb.into_recorded());
}

#[remoting_testhelpers::test]
fn sequence_end_instead_of_struct_end_is_rejected() {
    let mut reader = EventReader::new(vec![
        WireEvent::StructBegin(Cow::Borrowed("Struct4")),
        WireEvent::Absent(Cow::Borrowed("ptr")),
        WireEvent::Scalar {
            name: Cow::Borrowed("value"),
            value: remoting_core::ScalarValue::Str(Cow::Borrowed("v")),
        },
        WireEvent::SequenceBegin {
            name: Cow::Borrowed("vec"),
            len: Some(0),
        },
        WireEvent::SequenceEnd(Cow::Borrowed("vec")),
        WireEvent::SequenceEnd(Cow::Borrowed("Struct4")),
    ]);
    let result = remoting_core::deserialize::<Struct4, _>("Struct4", &mut reader);
    match result {
        Err(DeserializeError::ProtocolMismatch { expected, got, .. }) => {
            assert_eq!(expected, "struct-end `Struct4`");
            assert_eq!(got, "sequence-end `Struct4`");
        }
        other => panic!("expected a protocol mismatch, got {other:?}"),
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
    let back = round_trip(&value);

    let mut depth = 0;
    let mut node = &back;
    while let Some(child) = node.vec.first() {
        depth += 1;
        node = child;
    }
    assert_eq!(depth, 1000);
    assert_eq!(node.value, "bottom");
}
