//! Hint-driven XML reader using quick-xml.
//!
//! XML does not say whether an element is a composite, a sequence, a scalar
//! or a present reference. The reader asks the decoding codec: every call
//! carries a [`WireKind`] hint, and the next element is interpreted as that
//! kind.
//!
//! An empty reference is a `nil="true"` element. Presence has no marker of its
//! own, except when the held value is itself an empty reference: the element
//! then carries `present="N"`, the number of present references around it.

use std::borrow::Cow;
use std::io::Cursor;

use quick_xml::NsReader;
use quick_xml::errors::SyntaxError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use remoting_core::{
    Codec, DeserializeError, ScalarValue, WireContext, WireEvent, WireKind, WireOptions,
    WireReader,
};

use crate::error::{XmlError, XmlErrorKind};
use crate::serializer::ITEM;

/// A start tag, before it is interpreted.
#[derive(Debug, Clone)]
struct Open {
    local: String,
    namespace: Option<String>,
    nil: bool,
    /// Present references wrapped around a `nil` element.
    present: usize,
    empty: bool,
    pos: usize,
}

/// One piece of markup.
#[derive(Debug, Clone)]
enum Token {
    Open(Open),
    Close,
    Text(String),
    Eof,
}

/// A token that is not whitespace between elements.
enum Markup {
    Open(Open),
    Close,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Struct,
    Sequence,
}

/// An element opened as a composite or a sequence.
#[derive(Debug)]
struct Frame {
    name: String,
    kind: FrameKind,
}

/// [`WireReader`] over an XML document.
pub struct XmlReader<'de> {
    reader: NsReader<Cursor<&'de [u8]>>,
    /// Buffer for quick-xml events
    buf: Vec<u8>,
    /// A token read but not consumed
    pending: Option<Token>,
    /// Buffer for peeked event
    peeked: Option<WireEvent<'de>>,
    frames: Vec<Frame>,
    context: WireContext,
}

impl<'de> XmlReader<'de> {
    /// Read `input` with default options.
    pub fn new(input: &'de str) -> Self {
        Self::with_options(input, WireOptions::default())
    }

    /// Read `input` with the given options.
    pub fn with_options(input: &'de str, options: WireOptions) -> Self {
        tracing::trace!(input_len = input.len(), "creating XML reader");
        let reader = NsReader::from_reader(Cursor::new(input.as_bytes()));
        Self {
            reader,
            buf: Vec::new(),
            pending: None,
            peeked: None,
            frames: Vec::new(),
            context: WireContext::with_options(options),
        }
    }

    /// Fail unless only whitespace, comments and processing instructions
    /// follow the root element.
    pub fn finish(&mut self) -> Result<(), XmlError> {
        if self.peeked.is_some() {
            return Err(XmlError::at(XmlErrorKind::TrailingContent, self.offset()));
        }
        loop {
            match self.next_token()? {
                Token::Eof => return Ok(()),
                Token::Text(text) if text.trim().is_empty() => {}
                _ => return Err(XmlError::at(XmlErrorKind::TrailingContent, self.offset())),
            }
        }
    }

    fn offset(&self) -> usize {
        usize::try_from(self.reader.buffer_position()).unwrap_or(usize::MAX)
    }

    /// Read the next token from quick-xml, skipping declarations, comments
    /// and processing instructions.
    fn next_token(&mut self) -> Result<Token, XmlError> {
        if let Some(token) = self.pending.take() {
            return Ok(token);
        }
        loop {
            let pos = self.offset();
            self.buf.clear();
            let (resolve, event) = match self.reader.read_resolved_event_into(&mut self.buf) {
                Ok(read) => read,
                Err(quick_xml::Error::Syntax(cause)) if cause != SyntaxError::InvalidBangMarkup => {
                    tracing::trace!(pos, %cause, "document ends inside markup");
                    return Ok(Token::Eof);
                }
                Err(e) => return Err(XmlError::at(XmlErrorKind::Parse(e.to_string()), pos)),
            };
            let namespace = resolve_namespace(resolve);

            let token = match event {
                Event::Start(ref e) => Token::Open(open_tag(e, namespace, false, pos)?),
                Event::Empty(ref e) => Token::Open(open_tag(e, namespace, true, pos)?),
                Event::End(_) => Token::Close,
                Event::Text(e) => {
                    let text = e
                        .decode()
                        .map_err(|e| XmlError::at(XmlErrorKind::Parse(e.to_string()), pos))?;
                    Token::Text(text.into_owned())
                }
                Event::CData(e) => {
                    let text = core::str::from_utf8(e.as_ref())
                        .map_err(|_| XmlError::at(XmlErrorKind::InvalidUtf8, pos))?;
                    Token::Text(text.to_string())
                }
                Event::GeneralRef(e) => {
                    let raw = e
                        .decode()
                        .map_err(|e| XmlError::at(XmlErrorKind::Parse(e.to_string()), pos))?;
                    Token::Text(resolve_entity(&raw).map_err(|kind| XmlError::at(kind, pos))?)
                }
                Event::Eof => Token::Eof,
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => continue,
            };
            return Ok(token);
        }
    }

    /// Next token that is not whitespace between elements.
    fn next_markup(&mut self) -> Result<Markup, XmlError> {
        loop {
            match self.next_token()? {
                Token::Text(text) if text.trim().is_empty() => {}
                Token::Text(text) => {
                    return Err(XmlError::at(XmlErrorKind::UnexpectedText(text), self.offset()));
                }
                Token::Open(open) => return Ok(Markup::Open(open)),
                Token::Close => return Ok(Markup::Close),
                Token::Eof => return Ok(Markup::Eof),
            }
        }
    }

    /// Name an element travels under. `item` inside a sequence is an element
    /// of that sequence.
    fn wire_name(&self, local: &str) -> String {
        match self.frames.last() {
            Some(frame) if frame.kind == FrameKind::Sequence && local == ITEM => String::new(),
            _ => local.to_string(),
        }
    }

    fn check_namespace(&self, open: &Open) -> Result<(), XmlError> {
        let expected = self.context.namespace();
        if open.namespace.as_deref() != expected {
            return Err(XmlError::at(
                XmlErrorKind::NamespaceMismatch {
                    expected: expected.map(str::to_owned),
                    got: open.namespace.clone(),
                },
                open.pos,
            ));
        }
        Ok(())
    }

    /// Text content of a scalar element, up to and including its end tag.
    ///
    /// `None` if the document ends first.
    fn read_text(&mut self) -> Result<Option<String>, XmlError> {
        let mut text = String::new();
        loop {
            match self.next_token()? {
                Token::Text(chunk) => text.push_str(&chunk),
                Token::Close => return Ok(Some(text)),
                Token::Open(open) => {
                    return Err(XmlError::at(
                        XmlErrorKind::UnexpectedElement(open.local),
                        open.pos,
                    ));
                }
                Token::Eof => return Ok(None),
            }
        }
    }

    fn open_frame(&mut self, name: String, kind: FrameKind, empty: bool) {
        self.frames.push(Frame { name, kind });
        if empty {
            self.pending = Some(Token::Close);
        }
    }

    fn read_event(&mut self, hint: WireKind) -> Result<Option<WireEvent<'de>>, XmlError> {
        let open = match self.next_markup()? {
            Markup::Eof => return Ok(None),
            Markup::Close => {
                let Some(frame) = self.frames.pop() else {
                    return Err(XmlError::at(
                        XmlErrorKind::Parse("end tag outside any open element".into()),
                        self.offset(),
                    ));
                };
                let name = Cow::Owned(frame.name);
                return Ok(Some(match frame.kind {
                    FrameKind::Struct => WireEvent::StructEnd(name),
                    FrameKind::Sequence => WireEvent::SequenceEnd(name),
                }));
            }
            Markup::Open(open) => open,
        };

        self.check_namespace(&open)?;
        let name = self.wire_name(&open.local);

        if open.present > 0 {
            let mut open = open;
            open.present -= 1;
            self.pending = Some(Token::Open(open));
            return Ok(Some(WireEvent::Present(Cow::Owned(name))));
        }

        if open.nil {
            if !open.empty {
                match self.next_markup()? {
                    Markup::Close => {}
                    Markup::Eof => return Ok(None),
                    Markup::Open(_) => {
                        return Err(XmlError::at(
                            XmlErrorKind::NilWithContent(open.local),
                            open.pos,
                        ));
                    }
                }
            }
            return Ok(Some(WireEvent::Absent(Cow::Owned(name))));
        }

        let event = match hint {
            WireKind::Reference => {
                self.pending = Some(Token::Open(open));
                WireEvent::Present(Cow::Owned(name))
            }
            WireKind::Struct => {
                self.open_frame(name.clone(), FrameKind::Struct, open.empty);
                WireEvent::StructBegin(Cow::Owned(name))
            }
            WireKind::Sequence => {
                self.open_frame(name.clone(), FrameKind::Sequence, open.empty);
                WireEvent::SequenceBegin {
                    name: Cow::Owned(name),
                    len: None,
                }
            }
            WireKind::Scalar(_) => {
                let text = if open.empty {
                    String::new()
                } else {
                    match self.read_text()? {
                        Some(text) => text,
                        None => return Ok(None),
                    }
                };
                WireEvent::Scalar {
                    name: Cow::Owned(name),
                    value: ScalarValue::Str(Cow::Owned(text)),
                }
            }
        };
        Ok(Some(event))
    }
}

impl<'de> WireReader<'de> for XmlReader<'de> {
    type Error = XmlError;

    fn context(&mut self) -> &mut WireContext {
        &mut self.context
    }

    fn next_event(&mut self, hint: WireKind) -> Result<Option<WireEvent<'de>>, Self::Error> {
        if let Some(event) = self.peeked.take() {
            return Ok(Some(event));
        }
        self.read_event(hint)
    }

    fn peek_event(&mut self, hint: WireKind) -> Result<Option<WireEvent<'de>>, Self::Error> {
        if self.peeked.is_none() {
            self.peeked = self.read_event(hint)?;
        }
        Ok(self.peeked.clone())
    }
}

impl core::fmt::Debug for XmlReader<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("XmlReader")
            .field("pending", &self.pending)
            .field("peeked", &self.peeked)
            .field("frames", &self.frames)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

fn open_tag(
    e: &BytesStart<'_>,
    namespace: Option<String>,
    empty: bool,
    pos: usize,
) -> Result<Open, XmlError> {
    let local_name = e.local_name();
    let local = core::str::from_utf8(local_name.as_ref())
        .map_err(|_| XmlError::at(XmlErrorKind::InvalidUtf8, pos))?;

    let mut nil = false;
    let mut present = 0;
    for attr in e.attributes() {
        let attr = attr.map_err(|e| XmlError::at(XmlErrorKind::Parse(e.to_string()), pos))?;
        match attr.key.as_ref() {
            b"nil" => nil = attr.value.as_ref() == b"true",
            b"present" => {
                present = core::str::from_utf8(&attr.value)
                    .ok()
                    .and_then(|count| count.parse::<usize>().ok())
                    .ok_or_else(|| {
                        XmlError::at(
                            XmlErrorKind::Parse("`present` must be a count".into()),
                            pos,
                        )
                    })?;
            }
            _ => {}
        }
    }

    Ok(Open {
        local: local.to_string(),
        namespace,
        nil,
        present,
        empty,
        pos,
    })
}

/// Resolve a namespace from quick-xml's ResolveResult.
fn resolve_namespace(resolve: ResolveResult<'_>) -> Option<String> {
    match resolve {
        ResolveResult::Bound(ns) if !ns.as_ref().is_empty() => {
            Some(String::from_utf8_lossy(ns.as_ref()).into_owned())
        }
        ResolveResult::Bound(_) | ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

/// Resolve a general entity reference.
fn resolve_entity(raw: &str) -> Result<String, XmlErrorKind> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.into());
    }

    if let Some(rest) = raw.strip_prefix('#') {
        let code = match rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => rest.parse::<u32>().ok(),
        };
        if let Some(ch) = code.and_then(char::from_u32) {
            return Ok(ch.to_string());
        }
    }

    Err(XmlErrorKind::UnknownEntity(raw.to_string()))
}

/// Deserialize a value from XML whose root element is `name`.
pub fn from_str<T: Codec>(name: &str, input: &str) -> Result<T, DeserializeError<XmlError>> {
    from_str_with_options(name, input, WireOptions::default())
}

/// Deserialize a value from XML with custom options.
pub fn from_str_with_options<T: Codec>(
    name: &str,
    input: &str,
    options: WireOptions,
) -> Result<T, DeserializeError<XmlError>> {
    let mut reader = XmlReader::with_options(input, options);
    let result = remoting_core::deserialize(name, &mut reader)
        .and_then(|value| reader.finish().map(|()| value).map_err(DeserializeError::Backend));
    result.map_err(|err| match err {
        DeserializeError::Backend(err) => DeserializeError::Backend(err.with_source(input)),
        other => other,
    })
}
