use core::fmt;
use std::borrow::Cow;

/// Scalar kinds a codec can ask a reader for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// `bool`
    Bool,
    /// Signed integers.
    Int,
    /// Unsigned integers.
    UInt,
    /// `f32` / `f64`
    Float,
    /// Text, including `char`.
    String,
}

impl ScalarKind {
    /// Human-readable name used in error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            ScalarKind::Bool => "boolean",
            ScalarKind::Int => "signed integer",
            ScalarKind::UInt => "unsigned integer",
            ScalarKind::Float => "float",
            ScalarKind::String => "string",
        }
    }
}

/// Static wire shape of a type.
///
/// Every [`Codec`](crate::Codec) declares one. Self-describing readers ignore
/// it; markup readers use it to decide how to interpret the next element
/// (a `<value>` element is a scalar for `String` and a struct for `Struct4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    /// A primitive value.
    Scalar(ScalarKind),
    /// A composite with named fields.
    Struct,
    /// An ordered sequence.
    Sequence,
    /// An optional reference.
    Reference,
}

/// Primitive data carried by a scalar event.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue<'a> {
    /// Boolean literal.
    Bool(bool),
    /// Signed integer literal.
    I64(i64),
    /// Unsigned integer literal.
    U64(u64),
    /// Floating-point literal.
    F64(f64),
    /// UTF-8 string literal.
    Str(Cow<'a, str>),
}

impl ScalarValue<'_> {
    /// Detach from the input buffer.
    pub fn into_owned(self) -> ScalarValue<'static> {
        match self {
            ScalarValue::Bool(b) => ScalarValue::Bool(b),
            ScalarValue::I64(n) => ScalarValue::I64(n),
            ScalarValue::U64(n) => ScalarValue::U64(n),
            ScalarValue::F64(n) => ScalarValue::F64(n),
            ScalarValue::Str(s) => ScalarValue::Str(Cow::Owned(s.into_owned())),
        }
    }
}

impl fmt::Display for ScalarValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(b) => write!(f, "{b}"),
            ScalarValue::I64(n) => write!(f, "{n}"),
            ScalarValue::U64(n) => write!(f, "{n}"),
            ScalarValue::F64(n) => write!(f, "{n}"),
            ScalarValue::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// Event produced by a [`WireReader`](crate::WireReader) and recorded by the
/// in-memory [`EventWriter`](crate::EventWriter).
///
/// Every event carries the name it was written under. Sequence elements use
/// the empty name.
#[derive(Clone, PartialEq)]
pub enum WireEvent<'de> {
    /// Beginning of a composite.
    StructBegin(Cow<'de, str>),
    /// End of a composite.
    StructEnd(Cow<'de, str>),
    /// Beginning of a sequence, with its length when the format records one.
    SequenceBegin {
        /// Field name.
        name: Cow<'de, str>,
        /// Announced element count.
        len: Option<usize>,
    },
    /// End of a sequence.
    SequenceEnd(Cow<'de, str>),
    /// A primitive value.
    Scalar {
        /// Field name.
        name: Cow<'de, str>,
        /// The value.
        value: ScalarValue<'de>,
    },
    /// An empty reference.
    Absent(Cow<'de, str>),
    /// A reference holding a value; the value's own events follow.
    Present(Cow<'de, str>),
}

impl WireEvent<'_> {
    /// The name the event was written under.
    pub fn name(&self) -> &str {
        match self {
            WireEvent::StructBegin(name)
            | WireEvent::StructEnd(name)
            | WireEvent::SequenceEnd(name)
            | WireEvent::Absent(name)
            | WireEvent::Present(name) => name,
            WireEvent::SequenceBegin { name, .. } | WireEvent::Scalar { name, .. } => name,
        }
    }

    /// Detach from the input buffer.
    pub fn into_owned(self) -> WireEvent<'static> {
        fn own(s: Cow<'_, str>) -> Cow<'static, str> {
            Cow::Owned(s.into_owned())
        }
        match self {
            WireEvent::StructBegin(name) => WireEvent::StructBegin(own(name)),
            WireEvent::StructEnd(name) => WireEvent::StructEnd(own(name)),
            WireEvent::SequenceBegin { name, len } => WireEvent::SequenceBegin {
                name: own(name),
                len,
            },
            WireEvent::SequenceEnd(name) => WireEvent::SequenceEnd(own(name)),
            WireEvent::Scalar { name, value } => WireEvent::Scalar {
                name: own(name),
                value: value.into_owned(),
            },
            WireEvent::Absent(name) => WireEvent::Absent(own(name)),
            WireEvent::Present(name) => WireEvent::Present(own(name)),
        }
    }
}

impl fmt::Display for WireEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireEvent::StructBegin(name) => write!(f, "struct-begin `{name}`"),
            WireEvent::StructEnd(name) => write!(f, "struct-end `{name}`"),
            WireEvent::SequenceBegin { name, .. } => write!(f, "sequence-begin `{name}`"),
            WireEvent::SequenceEnd(name) => write!(f, "sequence-end `{name}`"),
            WireEvent::Scalar { name, value } => write!(f, "scalar `{name}` = {value}"),
            WireEvent::Absent(name) => write!(f, "absent `{name}`"),
            WireEvent::Present(name) => write!(f, "present `{name}`"),
        }
    }
}

impl fmt::Debug for WireEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireEvent::StructBegin(name) => f.debug_tuple("StructBegin").field(name).finish(),
            WireEvent::StructEnd(name) => f.debug_tuple("StructEnd").field(name).finish(),
            WireEvent::SequenceBegin { name, len } => f
                .debug_struct("SequenceBegin")
                .field("name", name)
                .field("len", len)
                .finish(),
            WireEvent::SequenceEnd(name) => f.debug_tuple("SequenceEnd").field(name).finish(),
            WireEvent::Scalar { name, value } => f
                .debug_struct("Scalar")
                .field("name", name)
                .field("value", value)
                .finish(),
            WireEvent::Absent(name) => f.debug_tuple("Absent").field(name).finish(),
            WireEvent::Present(name) => f.debug_tuple("Present").field(name).finish(),
        }
    }
}
