//! Frame writer.

use remoting_core::{Codec, ScalarValue, SerializeError, WireContext, WireOptions, WireWriter};

use crate::error::{BinaryError, BinaryErrorKind};
use crate::frame;

/// A byte sink for [`BinaryWriter`].
///
/// `Vec<u8>` grows as needed; [`SliceWriter`] fills a fixed buffer and fails
/// with [`BinaryErrorKind::BufferFull`] when it runs out.
pub trait Writer {
    /// Write a single byte.
    fn write_byte(&mut self, byte: u8) -> Result<(), BinaryError>;

    /// Write a slice of bytes.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BinaryError>;
}

impl Writer for Vec<u8> {
    fn write_byte(&mut self, byte: u8) -> Result<(), BinaryError> {
        self.push(byte);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BinaryError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Writes into a caller-provided buffer.
#[derive(Debug)]
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> SliceWriter<'a> {
    /// Write into `buf`, starting at its beginning.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    /// The bytes written so far.
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl Writer for SliceWriter<'_> {
    fn write_byte(&mut self, byte: u8) -> Result<(), BinaryError> {
        self.write_bytes(&[byte])
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BinaryError> {
        let end = self.len + bytes.len();
        let Some(dest) = self.buf.get_mut(self.len..end) else {
            return Err(BinaryError::new(BinaryErrorKind::BufferFull, self.len));
        };
        dest.copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }
}

/// [`WireWriter`] emitting binary frames into a [`Writer`].
#[derive(Debug)]
pub struct BinaryWriter<W> {
    out: W,
    context: WireContext,
}

impl<W: Writer> BinaryWriter<W> {
    /// Write frames into `out`.
    pub fn new(out: W) -> Self {
        Self::with_options(out, WireOptions::default())
    }

    /// Write frames into `out` with the given options.
    pub fn with_options(out: W, options: WireOptions) -> Self {
        Self {
            out,
            context: WireContext::with_options(options),
        }
    }

    /// Give back the byte sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_varint(&mut self, mut value: u64) -> Result<(), BinaryError> {
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.out.write_byte(byte)?;
            if value == 0 {
                return Ok(());
            }
        }
    }

    fn write_str(&mut self, s: &str) -> Result<(), BinaryError> {
        self.write_varint(s.len() as u64)?;
        self.out.write_bytes(s.as_bytes())
    }

    fn frame(&mut self, tag: u8, name: &str) -> Result<(), BinaryError> {
        self.out.write_byte(tag)?;
        self.write_str(name)
    }
}

impl<W: Writer> WireWriter for BinaryWriter<W> {
    type Error = BinaryError;

    fn context(&mut self) -> &mut WireContext {
        &mut self.context
    }

    fn begin_struct(&mut self, name: &str) -> Result<(), Self::Error> {
        self.frame(frame::STRUCT_BEGIN, name)
    }

    fn end_struct(&mut self, name: &str) -> Result<(), Self::Error> {
        self.frame(frame::STRUCT_END, name)
    }

    fn begin_sequence(&mut self, name: &str, len: usize) -> Result<(), Self::Error> {
        self.frame(frame::SEQUENCE_BEGIN, name)?;
        self.write_varint(len as u64)
    }

    fn end_sequence(&mut self, name: &str) -> Result<(), Self::Error> {
        self.frame(frame::SEQUENCE_END, name)
    }

    fn scalar(&mut self, name: &str, value: ScalarValue<'_>) -> Result<(), Self::Error> {
        match value {
            ScalarValue::Bool(b) => {
                self.frame(frame::BOOL, name)?;
                self.out.write_byte(u8::from(b))
            }
            ScalarValue::I64(n) => {
                self.frame(frame::INT, name)?;
                self.write_varint(((n << 1) ^ (n >> 63)) as u64)
            }
            ScalarValue::U64(n) => {
                self.frame(frame::UINT, name)?;
                self.write_varint(n)
            }
            ScalarValue::F64(n) => {
                self.frame(frame::FLOAT, name)?;
                self.out.write_bytes(&n.to_le_bytes())
            }
            ScalarValue::Str(s) => {
                self.frame(frame::STRING, name)?;
                self.write_str(&s)
            }
        }
    }

    fn absent(&mut self, name: &str) -> Result<(), Self::Error> {
        self.frame(frame::ABSENT, name)
    }

    fn present(&mut self, name: &str) -> Result<(), Self::Error> {
        self.frame(frame::PRESENT, name)
    }

    fn push_namespace(&mut self, uri: &str) -> Result<(), Self::Error> {
        tracing::trace!(uri, "namespace frame");
        self.frame(frame::NAMESPACE, uri)?;
        self.context.namespaces_mut().push(uri);
        Ok(())
    }
}

/// Serialize `value` under `name` into a new byte vector.
pub fn to_vec<T: Codec>(name: &str, value: &T) -> Result<Vec<u8>, SerializeError<BinaryError>> {
    to_vec_with_options(name, value, WireOptions::default())
}

/// Serialize `value` under `name` into a new byte vector, with options.
pub fn to_vec_with_options<T: Codec>(
    name: &str,
    value: &T,
    options: WireOptions,
) -> Result<Vec<u8>, SerializeError<BinaryError>> {
    let mut writer = BinaryWriter::with_options(Vec::new(), options);
    remoting_core::serialize(name, value, &mut writer)?;
    Ok(writer.into_inner())
}

/// Serialize `value` under `name` into any [`Writer`].
pub fn to_writer<T: Codec, W: Writer>(
    name: &str,
    value: &T,
    out: W,
) -> Result<W, SerializeError<BinaryError>> {
    let mut writer = BinaryWriter::new(out);
    remoting_core::serialize(name, value, &mut writer)?;
    Ok(writer.into_inner())
}
