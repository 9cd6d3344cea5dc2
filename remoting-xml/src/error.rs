//! Error types for the XML wire format.

use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// XML format error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlError {
    /// The specific kind of error
    pub(crate) kind: XmlErrorKind,
    /// Byte offset in the input, when reading
    pub(crate) pos: Option<usize>,
    /// Source document for diagnostics
    pub(crate) source_code: Option<String>,
}

impl XmlError {
    /// Returns a reference to the error kind for detailed error inspection.
    pub fn kind(&self) -> &XmlErrorKind {
        &self.kind
    }

    /// Byte offset in the input the error was detected at.
    pub fn position(&self) -> Option<usize> {
        self.pos
    }

    pub(crate) fn new(kind: impl Into<XmlErrorKind>) -> Self {
        XmlError {
            kind: kind.into(),
            pos: None,
            source_code: None,
        }
    }

    pub(crate) fn at(kind: impl Into<XmlErrorKind>, pos: usize) -> Self {
        XmlError {
            kind: kind.into(),
            pos: Some(pos),
            source_code: None,
        }
    }

    /// Attach source code to this error for diagnostics.
    pub(crate) fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_code = Some(source.into());
        self
    }
}

impl Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(f, "{} at byte {pos}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl Error for XmlError {}

impl<K: Into<XmlErrorKind>> From<K> for XmlError {
    fn from(value: K) -> Self {
        XmlError::new(value)
    }
}

/// Detailed classification of XML errors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum XmlErrorKind {
    // Deserialization errors
    /// The document is not well-formed.
    Parse(String),
    /// A name or text was not valid UTF-8.
    InvalidUtf8,
    /// Character data where an element was expected.
    UnexpectedText(String),
    /// A child element inside a scalar element.
    UnexpectedElement(String),
    /// An entity reference that is neither predefined nor a character reference.
    UnknownEntity(String),
    /// An element is not in the namespace the codec expects.
    NamespaceMismatch {
        /// Namespace the codec expects; `None` is no namespace.
        expected: Option<String>,
        /// Namespace the element resolved to.
        got: Option<String>,
    },
    /// A `nil="true"` element with content.
    NilWithContent(String),
    /// Elements or text after the root element.
    TrailingContent,

    // Serialization errors
    /// A wire name that cannot be an element name.
    InvalidName(String),
    /// IO error during serialization.
    Io(String),
}

impl XmlErrorKind {
    /// Returns an error code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            XmlErrorKind::Parse(_) => "xml::parse",
            XmlErrorKind::InvalidUtf8 => "xml::invalid_utf8",
            XmlErrorKind::UnexpectedText(_) => "xml::unexpected_text",
            XmlErrorKind::UnexpectedElement(_) => "xml::unexpected_element",
            XmlErrorKind::UnknownEntity(_) => "xml::unknown_entity",
            XmlErrorKind::NamespaceMismatch { .. } => "xml::namespace_mismatch",
            XmlErrorKind::NilWithContent(_) => "xml::nil_with_content",
            XmlErrorKind::TrailingContent => "xml::trailing_content",
            XmlErrorKind::InvalidName(_) => "xml::invalid_name",
            XmlErrorKind::Io(_) => "xml::io",
        }
    }
}

fn or_none(ns: Option<&str>) -> &str {
    ns.unwrap_or("no namespace")
}

impl Display for XmlErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlErrorKind::Parse(msg) => write!(f, "XML parse error: {msg}"),
            XmlErrorKind::InvalidUtf8 => write!(f, "invalid UTF-8 in XML"),
            XmlErrorKind::UnexpectedText(text) => {
                write!(f, "unexpected text {text:?} where an element was expected")
            }
            XmlErrorKind::UnexpectedElement(name) => {
                write!(f, "unexpected element '{name}' inside a scalar")
            }
            XmlErrorKind::UnknownEntity(name) => write!(f, "unknown entity '&{name};'"),
            XmlErrorKind::NamespaceMismatch { expected, got } => write!(
                f,
                "expected an element in {}, found one in {}",
                or_none(expected.as_deref()),
                or_none(got.as_deref())
            ),
            XmlErrorKind::NilWithContent(name) => {
                write!(f, "element '{name}' is nil but has content")
            }
            XmlErrorKind::TrailingContent => write!(f, "content after the root element"),
            XmlErrorKind::InvalidName(name) => write!(f, "`{name}` is not a valid element name"),
            XmlErrorKind::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl From<io::Error> for XmlErrorKind {
    fn from(value: io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

// ============================================================================
// Diagnostic Implementation
// ============================================================================

#[cfg(feature = "pretty-errors")]
impl miette::Diagnostic for XmlError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(format!("remoting_{}", self.kind.code())))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source_code
            .as_ref()
            .map(|s| s as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        let pos = self.pos?;
        self.source_code.as_ref()?;
        Some(Box::new(core::iter::once(miette::LabeledSpan::at_offset(
            pos,
            self.kind.to_string(),
        ))))
    }
}
