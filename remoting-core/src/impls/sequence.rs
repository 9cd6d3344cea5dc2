use std::collections::VecDeque;

use crate::expect::{Expected, expect_sequence_begin, mismatch, nest_reader, nest_writer, truncated};
use crate::tracing_macros::trace;
use crate::{
    Codec, DeserializeError, PathStep, SerializeError, WireEvent, WireKind, WireReader,
    WireWriter,
};

/// Upper bound on capacity reserved from a length announced by the input.
const MAX_PREALLOC: usize = 1024;

fn serialize_elements<'a, T, W, I>(
    name: &str,
    len: usize,
    items: I,
    writer: &mut W,
) -> Result<(), SerializeError<W::Error>>
where
    T: Codec + 'a,
    W: WireWriter + ?Sized,
    I: Iterator<Item = &'a T>,
{
    nest_writer(writer, |writer| {
        trace!(name, len, "sequence-begin");
        writer.begin_sequence(name, len)?;
        for (index, item) in items.enumerate() {
            writer.context().path_mut().push(PathStep::Index(index));
            let result = item.serialize("", writer);
            writer.context().path_mut().pop();
            result?;
        }
        writer.end_sequence(name)?;
        Ok(())
    })
}

fn deserialize_elements<'de, T, R, C>(
    name: &str,
    reader: &mut R,
    with_capacity: impl FnOnce(usize) -> C,
    push: impl Fn(&mut C, T),
) -> Result<C, DeserializeError<R::Error>>
where
    T: Codec,
    R: WireReader<'de> + ?Sized,
{
    nest_reader(reader, |reader| {
        let announced = expect_sequence_begin(reader, name)?;
        let mut items = with_capacity(announced.unwrap_or(0).min(MAX_PREALLOC));
        let mut count = 0usize;
        loop {
            match reader.peek_event(T::KIND)? {
                Some(WireEvent::SequenceEnd(got)) if got == name => {
                    reader.next_event(T::KIND)?;
                    trace!(name, count, "sequence-end");
                    break;
                }
                Some(_) => {
                    reader.context().path_mut().push(PathStep::Index(count));
                    let item = T::deserialize("", reader);
                    reader.context().path_mut().pop();
                    push(&mut items, item?);
                    count += 1;
                }
                None => return Err(truncated(reader.context(), Expected::SequenceEnd(name))),
            }
        }
        match announced {
            Some(len) if len != count => Err(mismatch(
                reader.context(),
                format!("{len} elements in `{name}`"),
                format!("{count} elements"),
            )),
            _ => Ok(items),
        }
    })
}

impl<T: Codec> Codec for Vec<T> {
    const KIND: WireKind = WireKind::Sequence;

    fn serialize<W: WireWriter + ?Sized>(
        &self,
        name: &str,
        writer: &mut W,
    ) -> Result<(), SerializeError<W::Error>> {
        serialize_elements(name, self.len(), self.iter(), writer)
    }

    fn deserialize<'de, R: WireReader<'de> + ?Sized>(
        name: &str,
        reader: &mut R,
    ) -> Result<Self, DeserializeError<R::Error>> {
        deserialize_elements(name, reader, Vec::with_capacity, Vec::push)
    }
}

impl<T: Codec> Codec for VecDeque<T> {
    const KIND: WireKind = WireKind::Sequence;

    fn serialize<W: WireWriter + ?Sized>(
        &self,
        name: &str,
        writer: &mut W,
    ) -> Result<(), SerializeError<W::Error>> {
        serialize_elements(name, self.len(), self.iter(), writer)
    }

    fn deserialize<'de, R: WireReader<'de> + ?Sized>(
        name: &str,
        reader: &mut R,
    ) -> Result<Self, DeserializeError<R::Error>> {
        deserialize_elements(name, reader, VecDeque::with_capacity, VecDeque::push_back)
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::collections::VecDeque;

    use crate::{DeserializeError, EventReader, EventWriter, ScalarValue, WireEvent};

    fn begin(name: &'static str, len: Option<usize>) -> WireEvent<'static> {
        WireEvent::SequenceBegin {
            name: Cow::Borrowed(name),
            len,
        }
    }

    fn item(n: u64) -> WireEvent<'static> {
        WireEvent::Scalar {
            name: Cow::Borrowed(""),
            value: ScalarValue::U64(n),
        }
    }

    #[test]
    fn elements_use_the_positional_slot() {
        let mut writer = EventWriter::new();
        crate::serialize("xs", &vec![1u32, 2], &mut writer).unwrap();
        assert_eq!(
            writer.into_events(),
            vec![
                begin("xs", Some(2)),
                item(1),
                item(2),
                WireEvent::SequenceEnd(Cow::Borrowed("xs")),
            ]
        );
    }

    #[test]
    fn empty_sequence_round_trips() {
        let mut writer = EventWriter::new();
        crate::serialize("xs", &Vec::<String>::new(), &mut writer).unwrap();
        let mut reader = EventReader::new(writer.into_events());
        let back: Vec<String> = crate::deserialize("xs", &mut reader).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn vec_deque_shares_the_wire_form() {
        let mut reader = EventReader::new(vec![
            begin("xs", None),
            item(3),
            item(4),
            WireEvent::SequenceEnd(Cow::Borrowed("xs")),
        ]);
        let back: VecDeque<u8> = crate::deserialize("xs", &mut reader).unwrap();
        assert_eq!(back, VecDeque::from([3, 4]));
    }

    #[test]
    fn announced_length_must_match() {
        let mut reader = EventReader::new(vec![
            begin("xs", Some(3)),
            item(1),
            WireEvent::SequenceEnd(Cow::Borrowed("xs")),
        ]);
        let err = crate::deserialize::<Vec<u8>, _>("xs", &mut reader).unwrap_err();
        assert_eq!(
            err.to_string(),
            "protocol mismatch at xs: expected 3 elements in `xs`, got 1 elements"
        );
    }

    #[test]
    fn element_errors_name_the_index() {
        let mut reader = EventReader::new(vec![
            begin("xs", None),
            item(1),
            item(300),
            WireEvent::SequenceEnd(Cow::Borrowed("xs")),
        ]);
        let err = crate::deserialize::<Vec<u8>, _>("xs", &mut reader).unwrap_err();
        assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("xs[1]"));
    }

    #[test]
    fn missing_end_is_truncated_input() {
        let mut reader = EventReader::new(vec![begin("xs", None), item(1)]);
        let err = crate::deserialize::<Vec<u8>, _>("xs", &mut reader).unwrap_err();
        assert!(matches!(err, DeserializeError::TruncatedInput { .. }), "{err}");
    }
}
