use core::fmt;

use crate::WirePath;

/// Error produced while serializing a value.
#[derive(Debug)]
pub enum SerializeError<E> {
    /// Error emitted by the wire writer.
    Backend(E),
    /// The value nests deeper than `WireOptions::max_depth`.
    DepthLimitExceeded {
        /// The configured limit.
        limit: usize,
        /// Where the limit was hit.
        path: WirePath,
    },
}

impl<E> From<E> for SerializeError<E> {
    fn from(err: E) -> Self {
        SerializeError::Backend(err)
    }
}

impl<E: fmt::Display> fmt::Display for SerializeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializeError::Backend(err) => write!(f, "{err}"),
            SerializeError::DepthLimitExceeded { limit, path } => {
                write!(f, "nesting depth limit of {limit} exceeded at {path}")
            }
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for SerializeError<E> {}

/// Error produced while deserializing a value.
///
/// No partial value is ever returned alongside one of these: the first error
/// aborts the whole value.
#[derive(Debug)]
pub enum DeserializeError<E> {
    /// Error emitted by the wire reader.
    Backend(E),
    /// A structural marker or field name did not match what the type expects.
    ProtocolMismatch {
        /// The marker the codec expected.
        expected: String,
        /// The marker that was read.
        got: String,
        /// Where the mismatch happened.
        path: WirePath,
    },
    /// An absence marker was read where the type cannot be absent.
    UnexpectedAbsence {
        /// Name the absence marker was written under.
        name: String,
        /// Where it was read.
        path: WirePath,
    },
    /// A presence marker was read where the type is not a reference.
    UnexpectedPresence {
        /// Name the presence marker was written under.
        name: String,
        /// Where it was read.
        path: WirePath,
    },
    /// The reader ran out of input.
    TruncatedInput {
        /// The marker the codec expected.
        expected: String,
        /// Where the input ended.
        path: WirePath,
    },
    /// A scalar could not be converted to the target type.
    InvalidScalar {
        /// The target type.
        expected: &'static str,
        /// The scalar that was read.
        got: String,
        /// Where it was read.
        path: WirePath,
    },
    /// The input nests deeper than `WireOptions::max_depth`.
    DepthLimitExceeded {
        /// The configured limit.
        limit: usize,
        /// Where the limit was hit.
        path: WirePath,
    },
}

impl<E> From<E> for DeserializeError<E> {
    fn from(err: E) -> Self {
        DeserializeError::Backend(err)
    }
}

impl<E> DeserializeError<E> {
    /// The path at which the error happened, if the error carries one.
    pub fn path(&self) -> Option<&WirePath> {
        match self {
            DeserializeError::Backend(_) => None,
            DeserializeError::ProtocolMismatch { path, .. }
            | DeserializeError::UnexpectedAbsence { path, .. }
            | DeserializeError::UnexpectedPresence { path, .. }
            | DeserializeError::TruncatedInput { path, .. }
            | DeserializeError::InvalidScalar { path, .. }
            | DeserializeError::DepthLimitExceeded { path, .. } => Some(path),
        }
    }

    /// True for [`DeserializeError::ProtocolMismatch`].
    pub const fn is_protocol_mismatch(&self) -> bool {
        matches!(self, DeserializeError::ProtocolMismatch { .. })
    }
}

impl<E: fmt::Display> fmt::Display for DeserializeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeserializeError::Backend(err) => write!(f, "{err}"),
            DeserializeError::ProtocolMismatch {
                expected,
                got,
                path,
            } => write!(f, "protocol mismatch at {path}: expected {expected}, got {got}"),
            DeserializeError::UnexpectedAbsence { name, path } => {
                write!(f, "unexpected absence marker `{name}` at {path}")
            }
            DeserializeError::UnexpectedPresence { name, path } => {
                write!(f, "unexpected presence marker `{name}` at {path}")
            }
            DeserializeError::TruncatedInput { expected, path } => {
                write!(f, "unexpected end of input at {path}, expected {expected}")
            }
            DeserializeError::InvalidScalar {
                expected,
                got,
                path,
            } => write!(f, "invalid scalar at {path}: expected {expected}, got {got}"),
            DeserializeError::DepthLimitExceeded { limit, path } => {
                write!(f, "nesting depth limit of {limit} exceeded at {path}")
            }
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for DeserializeError<E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PathStep;

    #[test]
    fn messages_carry_the_path() {
        let mut path = WirePath::new();
        path.push(PathStep::Root("Struct4".into()));
        path.push(PathStep::Field("vec"));
        let err: DeserializeError<String> = DeserializeError::ProtocolMismatch {
            expected: "struct-end `Struct4`".into(),
            got: "sequence-end `vec`".into(),
            path,
        };
        assert_eq!(
            err.to_string(),
            "protocol mismatch at Struct4.vec: expected struct-end `Struct4`, got sequence-end `vec`"
        );
        assert!(err.is_protocol_mismatch());
        assert_eq!(err.path().map(|p| p.len()), Some(2));
    }

    #[test]
    fn backend_errors_convert() {
        let err: SerializeError<String> = String::from("disk full").into();
        assert_eq!(err.to_string(), "disk full");
    }
}
