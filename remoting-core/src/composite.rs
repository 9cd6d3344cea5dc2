//! Building blocks for composite codecs.
//!
//! `#[derive(Codec)]` expands to calls into this module, and hand-written
//! composite codecs use it the same way:
//!
//! ```
//! use remoting_core::{composite, Codec, Composite, DeserializeError, Field, SerializeError};
//! use remoting_core::{WireKind, WireReader, WireWriter};
//!
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Composite for Point {
//!     const FIELDS: &'static [Field] = &[Field::new("x"), Field::namespaced("y", "urn:geo")];
//! }
//!
//! impl Codec for Point {
//!     const KIND: WireKind = WireKind::Struct;
//!
//!     fn serialize<W: WireWriter + ?Sized>(
//!         &self,
//!         name: &str,
//!         writer: &mut W,
//!     ) -> Result<(), SerializeError<W::Error>> {
//!         composite::serialize_struct(name, writer, |writer| {
//!             composite::serialize_field(writer, &Self::FIELDS[0], &self.x)?;
//!             composite::serialize_field(writer, &Self::FIELDS[1], &self.y)
//!         })
//!     }
//!
//!     fn deserialize<'de, R: WireReader<'de> + ?Sized>(
//!         name: &str,
//!         reader: &mut R,
//!     ) -> Result<Self, DeserializeError<R::Error>> {
//!         composite::deserialize_struct(name, reader, |reader| {
//!             Ok(Point {
//!                 x: composite::deserialize_field(reader, &Self::FIELDS[0])?,
//!                 y: composite::deserialize_field(reader, &Self::FIELDS[1])?,
//!             })
//!         })
//!     }
//! }
//! ```

use crate::expect::{expect_struct_begin, expect_struct_end, nest_reader, nest_writer};
use crate::tracing_macros::trace;
use crate::{
    Codec, DeserializeError, Field, NamespaceScope, PathStep, SerializeError, WireReader,
    WireWriter,
};

/// Write a composite: struct-begin, whatever `fields` writes, struct-end.
pub fn serialize_struct<W, F>(
    name: &str,
    writer: &mut W,
    fields: F,
) -> Result<(), SerializeError<W::Error>>
where
    W: WireWriter + ?Sized,
    F: FnOnce(&mut W) -> Result<(), SerializeError<W::Error>>,
{
    nest_writer(writer, |writer| {
        trace!(name, "struct-begin");
        writer.begin_struct(name)?;
        fields(writer)?;
        writer.end_struct(name)?;
        trace!(name, "struct-end");
        Ok(())
    })
}

/// Write one field through its type's codec, inside the field's namespace if
/// it has one.
pub fn serialize_field<W, T>(
    writer: &mut W,
    field: &Field,
    value: &T,
) -> Result<(), SerializeError<W::Error>>
where
    W: WireWriter + ?Sized,
    T: Codec,
{
    writer.context().path_mut().push(PathStep::Field(field.name));
    let result = match field.namespace {
        Some(uri) => match NamespaceScope::for_writer(writer, uri) {
            Ok(mut scope) => value.serialize(field.name, &mut *scope),
            Err(err) => Err(SerializeError::Backend(err)),
        },
        None => value.serialize(field.name, writer),
    };
    writer.context().path_mut().pop();
    result
}

/// Read a composite: struct-begin, whatever `fields` reads, struct-end.
///
/// `fields` must read every declared field in order; anything left over
/// before the struct-end is a protocol mismatch.
pub fn deserialize_struct<'de, R, T, F>(
    name: &str,
    reader: &mut R,
    fields: F,
) -> Result<T, DeserializeError<R::Error>>
where
    R: WireReader<'de> + ?Sized,
    F: FnOnce(&mut R) -> Result<T, DeserializeError<R::Error>>,
{
    nest_reader(reader, |reader| {
        expect_struct_begin(reader, name)?;
        let value = fields(reader)?;
        expect_struct_end(reader, name)?;
        Ok(value)
    })
}

/// Read one field through its type's codec, inside the field's namespace if
/// it has one.
pub fn deserialize_field<'de, R, T>(
    reader: &mut R,
    field: &Field,
) -> Result<T, DeserializeError<R::Error>>
where
    R: WireReader<'de> + ?Sized,
    T: Codec,
{
    reader.context().path_mut().push(PathStep::Field(field.name));
    let result = match field.namespace {
        Some(uri) => match NamespaceScope::for_reader(reader, uri) {
            Ok(mut scope) => T::deserialize(field.name, &mut *scope),
            Err(err) => Err(DeserializeError::Backend(err)),
        },
        None => T::deserialize(field.name, reader),
    };
    reader.context().path_mut().pop();
    result
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::{EventReader, EventWriter, ScalarValue, WireEvent, WireKind};

    #[derive(Debug, PartialEq)]
    struct Tagged {
        id: u32,
        label: String,
    }

    impl crate::Composite for Tagged {
        const FIELDS: &'static [Field] = &[Field::new("id"), Field::namespaced("label", "urn:t")];
    }

    impl Codec for Tagged {
        const KIND: WireKind = WireKind::Struct;

        fn serialize<W: WireWriter + ?Sized>(
            &self,
            name: &str,
            writer: &mut W,
        ) -> Result<(), SerializeError<W::Error>> {
            serialize_struct(name, writer, |writer| {
                serialize_field(writer, &Field::new("id"), &self.id)?;
                serialize_field(writer, &Field::namespaced("label", "urn:t"), &self.label)
            })
        }

        fn deserialize<'de, R: WireReader<'de> + ?Sized>(
            name: &str,
            reader: &mut R,
        ) -> Result<Self, DeserializeError<R::Error>> {
            deserialize_struct(name, reader, |reader| {
                Ok(Tagged {
                    id: deserialize_field(reader, &Field::new("id"))?,
                    label: deserialize_field(reader, &Field::namespaced("label", "urn:t"))?,
                })
            })
        }
    }

    fn scalar(name: &'static str, value: ScalarValue<'static>) -> WireEvent<'static> {
        WireEvent::Scalar {
            name: Cow::Borrowed(name),
            value,
        }
    }

    #[test]
    fn fields_are_written_in_declared_order() {
        let mut writer = EventWriter::new();
        let value = Tagged {
            id: 7,
            label: "seven".into(),
        };
        crate::serialize("tagged", &value, &mut writer).unwrap();

        let recorded = writer.into_recorded();
        let namespaces: Vec<_> = recorded.iter().map(|r| r.namespace.as_deref()).collect();
        assert_eq!(namespaces, vec![None, None, Some("urn:t"), None]);
        let events: Vec<_> = recorded.into_iter().map(|r| r.event).collect();
        assert_eq!(
            events,
            vec![
                WireEvent::StructBegin(Cow::Borrowed("tagged")),
                scalar("id", ScalarValue::U64(7)),
                scalar("label", ScalarValue::Str(Cow::Borrowed("seven"))),
                WireEvent::StructEnd(Cow::Borrowed("tagged")),
            ]
        );
    }

    #[test]
    fn swapped_fields_are_a_protocol_mismatch() {
        let mut reader = EventReader::new(vec![
            WireEvent::StructBegin(Cow::Borrowed("tagged")),
            scalar("label", ScalarValue::Str(Cow::Borrowed("seven"))),
            scalar("id", ScalarValue::U64(7)),
            WireEvent::StructEnd(Cow::Borrowed("tagged")),
        ]);
        let err = crate::deserialize::<Tagged, _>("tagged", &mut reader).unwrap_err();
        assert!(err.is_protocol_mismatch(), "{err}");
        assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("tagged.id"));
    }

    #[test]
    fn wrong_struct_name_is_a_protocol_mismatch() {
        let mut reader = EventReader::new(vec![WireEvent::StructBegin(Cow::Borrowed("other"))]);
        let err = crate::deserialize::<Tagged, _>("tagged", &mut reader).unwrap_err();
        assert_eq!(
            err.to_string(),
            "protocol mismatch at tagged: expected struct-begin `tagged`, got struct-begin `other`"
        );
    }

    #[test]
    fn missing_struct_end_is_truncated_input() {
        let mut reader = EventReader::new(vec![
            WireEvent::StructBegin(Cow::Borrowed("tagged")),
            scalar("id", ScalarValue::U64(7)),
            scalar("label", ScalarValue::Str(Cow::Borrowed("seven"))),
        ]);
        let err = crate::deserialize::<Tagged, _>("tagged", &mut reader).unwrap_err();
        assert!(
            matches!(err, DeserializeError::TruncatedInput { ref expected, .. } if expected == "struct-end `tagged`"),
            "{err}"
        );
    }

    #[test]
    fn absence_marker_for_a_struct_is_rejected() {
        let mut reader = EventReader::new(vec![WireEvent::Absent(Cow::Borrowed("tagged"))]);
        let err = crate::deserialize::<Tagged, _>("tagged", &mut reader).unwrap_err();
        assert!(
            matches!(err, DeserializeError::UnexpectedAbsence { ref name, .. } if name == "tagged"),
            "{err}"
        );
    }

    #[test]
    fn presence_marker_for_a_scalar_field_is_rejected() {
        let mut reader = EventReader::new(vec![
            WireEvent::StructBegin(Cow::Borrowed("tagged")),
            WireEvent::Present(Cow::Borrowed("id")),
            scalar("id", ScalarValue::U64(7)),
        ]);
        let err = crate::deserialize::<Tagged, _>("tagged", &mut reader).unwrap_err();
        assert!(
            matches!(err, DeserializeError::UnexpectedPresence { ref name, .. } if name == "id"),
            "{err}"
        );
        assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("tagged.id"));
    }
}
