//! Shared event checks used by the composite, sequence and scalar codecs.

use core::fmt;

use crate::tracing_macros::trace;
use crate::{
    DeserializeError, ScalarKind, ScalarValue, SerializeError, WireContext, WireEvent, WireKind,
    WireReader, WireWriter,
};

/// Marker a codec was waiting for, rendered into error messages.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Expected<'a> {
    StructBegin(&'a str),
    StructEnd(&'a str),
    SequenceBegin(&'a str),
    SequenceEnd(&'a str),
    Scalar(&'a str, ScalarKind),
    Reference(&'a str),
}

impl fmt::Display for Expected<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::StructBegin(name) => write!(f, "struct-begin `{name}`"),
            Expected::StructEnd(name) => write!(f, "struct-end `{name}`"),
            Expected::SequenceBegin(name) => write!(f, "sequence-begin `{name}`"),
            Expected::SequenceEnd(name) => write!(f, "sequence-end `{name}`"),
            Expected::Scalar(name, kind) => write!(f, "{} scalar `{name}`", kind.as_str()),
            Expected::Reference(name) => write!(f, "absent or present `{name}`"),
        }
    }
}

/// Error for an event that is not the expected one.
///
/// Reference markers get their own variants, since the receiving type cannot
/// hold a reference at all.
pub(crate) fn unexpected<E>(
    ctx: &mut WireContext,
    expected: Expected<'_>,
    got: WireEvent<'_>,
) -> DeserializeError<E> {
    match got {
        WireEvent::Absent(name) => DeserializeError::UnexpectedAbsence {
            name: name.into_owned(),
            path: ctx.path().clone(),
        },
        WireEvent::Present(name) => DeserializeError::UnexpectedPresence {
            name: name.into_owned(),
            path: ctx.path().clone(),
        },
        other => mismatch(ctx, expected, &other),
    }
}

pub(crate) fn mismatch<E>(
    ctx: &mut WireContext,
    expected: impl fmt::Display,
    got: impl fmt::Display,
) -> DeserializeError<E> {
    DeserializeError::ProtocolMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
        path: ctx.path().clone(),
    }
}

pub(crate) fn truncated<E>(ctx: &mut WireContext, expected: Expected<'_>) -> DeserializeError<E> {
    DeserializeError::TruncatedInput {
        expected: expected.to_string(),
        path: ctx.path().clone(),
    }
}

pub(crate) fn invalid_scalar<E>(
    ctx: &mut WireContext,
    expected: &'static str,
    got: &ScalarValue<'_>,
) -> DeserializeError<E> {
    DeserializeError::InvalidScalar {
        expected,
        got: got.to_string(),
        path: ctx.path().clone(),
    }
}

pub(crate) fn expect_struct_begin<'de, R>(
    reader: &mut R,
    name: &str,
) -> Result<(), DeserializeError<R::Error>>
where
    R: WireReader<'de> + ?Sized,
{
    match reader.next_event(WireKind::Struct)? {
        Some(WireEvent::StructBegin(got)) if got == name => {
            trace!(name, "struct-begin");
            Ok(())
        }
        Some(other) => Err(unexpected(reader.context(), Expected::StructBegin(name), other)),
        None => Err(truncated(reader.context(), Expected::StructBegin(name))),
    }
}

pub(crate) fn expect_struct_end<'de, R>(
    reader: &mut R,
    name: &str,
) -> Result<(), DeserializeError<R::Error>>
where
    R: WireReader<'de> + ?Sized,
{
    match reader.next_event(WireKind::Struct)? {
        Some(WireEvent::StructEnd(got)) if got == name => {
            trace!(name, "struct-end");
            Ok(())
        }
        Some(other) => Err(unexpected(reader.context(), Expected::StructEnd(name), other)),
        None => Err(truncated(reader.context(), Expected::StructEnd(name))),
    }
}

/// Returns the element count announced by the reader, if any.
pub(crate) fn expect_sequence_begin<'de, R>(
    reader: &mut R,
    name: &str,
) -> Result<Option<usize>, DeserializeError<R::Error>>
where
    R: WireReader<'de> + ?Sized,
{
    match reader.next_event(WireKind::Sequence)? {
        Some(WireEvent::SequenceBegin { name: got, len }) if got == name => {
            trace!(name, ?len, "sequence-begin");
            Ok(len)
        }
        Some(other) => Err(unexpected(reader.context(), Expected::SequenceBegin(name), other)),
        None => Err(truncated(reader.context(), Expected::SequenceBegin(name))),
    }
}

pub(crate) fn expect_scalar<'de, R>(
    reader: &mut R,
    name: &str,
    kind: ScalarKind,
) -> Result<ScalarValue<'de>, DeserializeError<R::Error>>
where
    R: WireReader<'de> + ?Sized,
{
    match reader.next_event(WireKind::Scalar(kind))? {
        Some(WireEvent::Scalar { name: got, value }) if got == name => Ok(value),
        Some(other) => Err(unexpected(reader.context(), Expected::Scalar(name, kind), other)),
        None => Err(truncated(reader.context(), Expected::Scalar(name, kind))),
    }
}

/// Run `f` one nesting level deeper on a writer.
pub(crate) fn nest_writer<W, T, F>(writer: &mut W, f: F) -> Result<T, SerializeError<W::Error>>
where
    W: WireWriter + ?Sized,
    F: FnOnce(&mut W) -> Result<T, SerializeError<W::Error>>,
{
    let ctx = writer.context();
    if !ctx.enter() {
        return Err(SerializeError::DepthLimitExceeded {
            limit: ctx.options().max_depth,
            path: ctx.path().clone(),
        });
    }
    let result = grow(|| f(writer));
    writer.context().leave();
    result
}

/// Run `f` one nesting level deeper on a reader.
pub(crate) fn nest_reader<'de, R, T, F>(
    reader: &mut R,
    f: F,
) -> Result<T, DeserializeError<R::Error>>
where
    R: WireReader<'de> + ?Sized,
    F: FnOnce(&mut R) -> Result<T, DeserializeError<R::Error>>,
{
    let ctx = reader.context();
    if !ctx.enter() {
        return Err(DeserializeError::DepthLimitExceeded {
            limit: ctx.options().max_depth,
            path: ctx.path().clone(),
        });
    }
    let result = grow(|| f(reader));
    reader.context().leave();
    result
}

#[cfg(feature = "stacker")]
#[inline]
fn grow<T>(f: impl FnOnce() -> T) -> T {
    const RED_ZONE: usize = 64 * 1024;
    const NEW_SEGMENT: usize = 1024 * 1024;
    stacker::maybe_grow(RED_ZONE, NEW_SEGMENT, f)
}

#[cfg(not(feature = "stacker"))]
#[inline(always)]
fn grow<T>(f: impl FnOnce() -> T) -> T {
    f()
}
