use core::fmt;

/// What went wrong while reading or writing binary frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryErrorKind {
    /// Input ended in the middle of a frame.
    UnexpectedEof,
    /// A varint ran past 64 bits.
    VarintOverflow,
    /// A length does not fit in `usize`.
    LengthOverflow,
    /// A string was not valid UTF-8.
    InvalidUtf8,
    /// A bool payload was neither `0x00` nor `0x01`.
    InvalidBool(u8),
    /// A tag byte does not name any frame.
    InvalidTag(u8),
    /// A namespace frame showed up where a field's own frames were expected.
    UnexpectedNamespace(String),
    /// A namespaced field was not preceded by its namespace frame.
    MissingNamespace {
        /// Namespace the codec expected.
        expected: String,
    },
    /// A namespace frame named a different namespace than the codec expected.
    NamespaceMismatch {
        /// Namespace the codec expected.
        expected: String,
        /// Namespace found in the input.
        got: String,
    },
    /// Bytes were left over after the root value.
    TrailingBytes {
        /// Number of bytes left.
        remaining: usize,
    },
    /// A fixed-size output buffer is full.
    BufferFull,
}

impl BinaryErrorKind {
    /// Stable identifier, used as the diagnostic code.
    pub const fn code(&self) -> &'static str {
        match self {
            BinaryErrorKind::UnexpectedEof => "unexpected_eof",
            BinaryErrorKind::VarintOverflow => "varint_overflow",
            BinaryErrorKind::LengthOverflow => "length_overflow",
            BinaryErrorKind::InvalidUtf8 => "invalid_utf8",
            BinaryErrorKind::InvalidBool(_) => "invalid_bool",
            BinaryErrorKind::InvalidTag(_) => "invalid_tag",
            BinaryErrorKind::UnexpectedNamespace(_) => "unexpected_namespace",
            BinaryErrorKind::MissingNamespace { .. } => "missing_namespace",
            BinaryErrorKind::NamespaceMismatch { .. } => "namespace_mismatch",
            BinaryErrorKind::TrailingBytes { .. } => "trailing_bytes",
            BinaryErrorKind::BufferFull => "buffer_full",
        }
    }
}

impl fmt::Display for BinaryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryErrorKind::UnexpectedEof => write!(f, "unexpected end of input"),
            BinaryErrorKind::VarintOverflow => write!(f, "varint overflow"),
            BinaryErrorKind::LengthOverflow => write!(f, "length does not fit in memory"),
            BinaryErrorKind::InvalidUtf8 => write!(f, "invalid UTF-8 in string"),
            BinaryErrorKind::InvalidBool(b) => {
                write!(f, "invalid boolean value {b:#04x} (expected 0 or 1)")
            }
            BinaryErrorKind::InvalidTag(tag) => write!(f, "invalid frame tag {tag:#04x}"),
            BinaryErrorKind::UnexpectedNamespace(uri) => {
                write!(f, "unexpected namespace frame `{uri}`")
            }
            BinaryErrorKind::MissingNamespace { expected } => {
                write!(f, "expected namespace frame `{expected}`")
            }
            BinaryErrorKind::NamespaceMismatch { expected, got } => {
                write!(f, "expected namespace `{expected}`, got `{got}`")
            }
            BinaryErrorKind::TrailingBytes { remaining } => {
                write!(f, "{remaining} trailing bytes after the root value")
            }
            BinaryErrorKind::BufferFull => write!(f, "output buffer is full"),
        }
    }
}

/// Binary format error, with the byte offset it happened at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryError {
    /// What went wrong.
    pub kind: BinaryErrorKind,
    /// Offset of the frame (or byte) at fault.
    pub pos: usize,
}

impl BinaryError {
    pub(crate) const fn new(kind: BinaryErrorKind, pos: usize) -> Self {
        Self { kind, pos }
    }
}

impl fmt::Display for BinaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.kind, self.pos)
    }
}

impl std::error::Error for BinaryError {}

#[cfg(feature = "pretty-errors")]
impl miette::Diagnostic for BinaryError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("remoting_binary::{}", self.kind.code())))
    }
}
