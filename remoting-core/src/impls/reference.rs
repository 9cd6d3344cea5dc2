use std::sync::Arc;

use crate::expect::{Expected, mismatch, nest_reader, nest_writer, truncated};
use crate::tracing_macros::trace;
use crate::{Codec, DeserializeError, SerializeError, WireEvent, WireKind, WireReader, WireWriter};

/// Optional, shared ownership of a `T`.
///
/// Any `Option<P>` where `P: Codec` is a reference on the wire; this alias is
/// the usual choice for fields that point back at their own type.
pub type Reference<T> = Option<Arc<T>>;

impl<T: Codec> Codec for Option<T> {
    const KIND: WireKind = WireKind::Reference;

    fn serialize<W: WireWriter + ?Sized>(
        &self,
        name: &str,
        writer: &mut W,
    ) -> Result<(), SerializeError<W::Error>> {
        nest_writer(writer, |writer| match self {
            None => {
                trace!(name, "absent");
                writer.absent(name)?;
                Ok(())
            }
            Some(value) => {
                trace!(name, "present");
                writer.present(name)?;
                value.serialize(name, writer)
            }
        })
    }

    fn deserialize<'de, R: WireReader<'de> + ?Sized>(
        name: &str,
        reader: &mut R,
    ) -> Result<Self, DeserializeError<R::Error>> {
        nest_reader(reader, |reader| match reader.next_event(WireKind::Reference)? {
            Some(WireEvent::Absent(got)) if got == name => Ok(None),
            Some(WireEvent::Present(got)) if got == name => T::deserialize(name, reader).map(Some),
            Some(other) => Err(mismatch(reader.context(), Expected::Reference(name), other)),
            None => Err(truncated(reader.context(), Expected::Reference(name))),
        })
    }
}
