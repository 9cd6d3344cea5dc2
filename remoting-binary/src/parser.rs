//! Frame reader.

use std::borrow::Cow;

use remoting_core::{
    Codec, DeserializeError, ScalarValue, WireContext, WireEvent, WireKind, WireOptions,
    WireReader,
};

use crate::error::{BinaryError, BinaryErrorKind};
use crate::frame;

/// [`WireReader`] decoding binary frames from a byte slice.
///
/// Strings and names borrow from the input.
#[derive(Debug)]
pub struct BinaryReader<'de> {
    input: &'de [u8],
    pos: usize,
    /// Peeked event and the offset its frame started at.
    peeked: Option<(WireEvent<'de>, usize)>,
    context: WireContext,
}

impl<'de> BinaryReader<'de> {
    /// Read frames from `input`.
    pub fn new(input: &'de [u8]) -> Self {
        Self::with_options(input, WireOptions::default())
    }

    /// Read frames from `input` with the given options.
    pub fn with_options(input: &'de [u8], options: WireOptions) -> Self {
        Self {
            input,
            pos: 0,
            peeked: None,
            context: WireContext::with_options(options),
        }
    }

    /// Offset of the next unread byte. A peeked frame counts as unread.
    pub fn position(&self) -> usize {
        match &self.peeked {
            Some((_, start)) => *start,
            None => self.pos,
        }
    }

    /// Fail unless every byte was consumed.
    pub fn finish(&self) -> Result<(), BinaryError> {
        let consumed = self.position();
        if consumed < self.input.len() {
            return Err(BinaryError::new(
                BinaryErrorKind::TrailingBytes {
                    remaining: self.input.len() - consumed,
                },
                consumed,
            ));
        }
        Ok(())
    }

    fn eof(&self) -> BinaryError {
        BinaryError::new(BinaryErrorKind::UnexpectedEof, self.pos)
    }

    fn read_byte(&mut self) -> Result<u8, BinaryError> {
        let byte = *self.input.get(self.pos).ok_or_else(|| self.eof())?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'de [u8], BinaryError> {
        let end = self.pos.checked_add(len).ok_or_else(|| self.eof())?;
        let bytes = self.input.get(self.pos..end).ok_or_else(|| self.eof())?;
        self.pos = end;
        Ok(bytes)
    }

    fn read_varint(&mut self) -> Result<u64, BinaryError> {
        let start = self.pos;
        let mut result: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = self.read_byte()?;
            // the tenth byte holds the top bit and nothing else
            if shift == 63 && byte > 1 {
                return Err(BinaryError::new(BinaryErrorKind::VarintOverflow, start));
            }
            result |= u64::from(byte & 0x7F) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
    }

    fn read_len(&mut self) -> Result<usize, BinaryError> {
        let start = self.pos;
        let len = self.read_varint()?;
        usize::try_from(len).map_err(|_| BinaryError::new(BinaryErrorKind::LengthOverflow, start))
    }

    fn read_str(&mut self) -> Result<Cow<'de, str>, BinaryError> {
        let len = self.read_len()?;
        let start = self.pos;
        let bytes = self.read_bytes(len)?;
        core::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|_| BinaryError::new(BinaryErrorKind::InvalidUtf8, start))
    }

    /// Next frame, or `None` once the input runs out, between frames or
    /// inside one. The position stays at the start of a cut-off frame.
    fn read_frame(&mut self) -> Result<Option<WireEvent<'de>>, BinaryError> {
        let start = self.pos;
        match self.decode_frame() {
            Err(err) if err.kind == BinaryErrorKind::UnexpectedEof => {
                tracing::trace!(pos = start, "input ends inside a frame");
                self.pos = start;
                Ok(None)
            }
            other => other,
        }
    }

    fn decode_frame(&mut self) -> Result<Option<WireEvent<'de>>, BinaryError> {
        if self.pos == self.input.len() {
            return Ok(None);
        }
        let start = self.pos;
        let tag = self.read_byte()?;
        let event = match tag {
            frame::STRUCT_BEGIN => WireEvent::StructBegin(self.read_str()?),
            frame::STRUCT_END => WireEvent::StructEnd(self.read_str()?),
            frame::SEQUENCE_BEGIN => {
                let name = self.read_str()?;
                let len = self.read_len()?;
                WireEvent::SequenceBegin {
                    name,
                    len: Some(len),
                }
            }
            frame::SEQUENCE_END => WireEvent::SequenceEnd(self.read_str()?),
            frame::ABSENT => WireEvent::Absent(self.read_str()?),
            frame::PRESENT => WireEvent::Present(self.read_str()?),
            frame::NAMESPACE => {
                let uri = self.read_str()?;
                return Err(BinaryError::new(
                    BinaryErrorKind::UnexpectedNamespace(uri.into_owned()),
                    start,
                ));
            }
            frame::BOOL => {
                let name = self.read_str()?;
                let value = match self.read_byte()? {
                    0 => false,
                    1 => true,
                    other => {
                        return Err(BinaryError::new(
                            BinaryErrorKind::InvalidBool(other),
                            self.pos - 1,
                        ));
                    }
                };
                WireEvent::Scalar {
                    name,
                    value: ScalarValue::Bool(value),
                }
            }
            frame::INT => {
                let name = self.read_str()?;
                let raw = self.read_varint()?;
                let value = ((raw >> 1) as i64) ^ -((raw & 1) as i64);
                WireEvent::Scalar {
                    name,
                    value: ScalarValue::I64(value),
                }
            }
            frame::UINT => {
                let name = self.read_str()?;
                WireEvent::Scalar {
                    name,
                    value: ScalarValue::U64(self.read_varint()?),
                }
            }
            frame::FLOAT => {
                let name = self.read_str()?;
                let bytes = self.read_bytes(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                WireEvent::Scalar {
                    name,
                    value: ScalarValue::F64(f64::from_le_bytes(raw)),
                }
            }
            frame::STRING => {
                let name = self.read_str()?;
                WireEvent::Scalar {
                    name,
                    value: ScalarValue::Str(self.read_str()?),
                }
            }
            other => return Err(BinaryError::new(BinaryErrorKind::InvalidTag(other), start)),
        };
        tracing::trace!(pos = start, %event, "frame");
        Ok(Some(event))
    }
}

impl<'de> WireReader<'de> for BinaryReader<'de> {
    type Error = BinaryError;

    fn context(&mut self) -> &mut WireContext {
        &mut self.context
    }

    fn next_event(&mut self, _hint: WireKind) -> Result<Option<WireEvent<'de>>, Self::Error> {
        match self.peeked.take() {
            Some((event, _)) => Ok(Some(event)),
            None => self.read_frame(),
        }
    }

    fn peek_event(&mut self, _hint: WireKind) -> Result<Option<WireEvent<'de>>, Self::Error> {
        if let Some((event, _)) = &self.peeked {
            return Ok(Some(event.clone()));
        }
        let start = self.pos;
        match self.read_frame()? {
            Some(event) => {
                self.peeked = Some((event.clone(), start));
                Ok(Some(event))
            }
            None => {
                self.pos = start;
                Ok(None)
            }
        }
    }

    fn push_namespace(&mut self, uri: &str) -> Result<(), Self::Error> {
        let start = self.pos;
        if self.peeked.is_none() && self.pos == self.input.len() {
            // nothing left to check; the field's first read reports the truncation
            self.context.namespaces_mut().push(uri);
            return Ok(());
        }
        if self.peeked.is_some() || self.input.get(self.pos) != Some(&frame::NAMESPACE) {
            return Err(BinaryError::new(
                BinaryErrorKind::MissingNamespace {
                    expected: uri.to_string(),
                },
                self.position(),
            ));
        }
        self.pos += 1;
        let got = match self.read_str() {
            Ok(got) => got,
            Err(err) if err.kind == BinaryErrorKind::UnexpectedEof => {
                self.pos = start;
                self.context.namespaces_mut().push(uri);
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        if got != uri {
            return Err(BinaryError::new(
                BinaryErrorKind::NamespaceMismatch {
                    expected: uri.to_string(),
                    got: got.into_owned(),
                },
                start,
            ));
        }
        self.context.namespaces_mut().push(uri);
        Ok(())
    }
}

/// Deserialize a value written under `name` from `input`.
///
/// The whole input must be consumed.
pub fn from_slice<T: Codec>(name: &str, input: &[u8]) -> Result<T, DeserializeError<BinaryError>> {
    from_slice_with_options(name, input, WireOptions::default())
}

/// Deserialize a value written under `name` from `input`, with options.
pub fn from_slice_with_options<T: Codec>(
    name: &str,
    input: &[u8],
    options: WireOptions,
) -> Result<T, DeserializeError<BinaryError>> {
    let mut reader = BinaryReader::with_options(input, options);
    let value = remoting_core::deserialize(name, &mut reader)?;
    reader.finish()?;
    Ok(value)
}
