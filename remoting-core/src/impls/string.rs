use std::borrow::Cow;

use crate::expect::{expect_scalar, invalid_scalar};
use crate::{
    Codec, DeserializeError, ScalarKind, ScalarValue, SerializeError, WireKind, WireReader,
    WireWriter,
};

impl Codec for String {
    const KIND: WireKind = WireKind::Scalar(ScalarKind::String);

    fn serialize<W: WireWriter + ?Sized>(
        &self,
        name: &str,
        writer: &mut W,
    ) -> Result<(), SerializeError<W::Error>> {
        writer.scalar(name, ScalarValue::Str(Cow::Borrowed(self.as_str())))?;
        Ok(())
    }

    fn deserialize<'de, R: WireReader<'de> + ?Sized>(
        name: &str,
        reader: &mut R,
    ) -> Result<Self, DeserializeError<R::Error>> {
        match expect_scalar(reader, name, ScalarKind::String)? {
            ScalarValue::Str(s) => Ok(s.into_owned()),
            other => Err(invalid_scalar(reader.context(), "string", &other)),
        }
    }
}

impl Codec for char {
    const KIND: WireKind = WireKind::Scalar(ScalarKind::String);

    fn serialize<W: WireWriter + ?Sized>(
        &self,
        name: &str,
        writer: &mut W,
    ) -> Result<(), SerializeError<W::Error>> {
        let mut buf = [0u8; 4];
        let s: &str = self.encode_utf8(&mut buf);
        writer.scalar(name, ScalarValue::Str(Cow::Borrowed(s)))?;
        Ok(())
    }

    fn deserialize<'de, R: WireReader<'de> + ?Sized>(
        name: &str,
        reader: &mut R,
    ) -> Result<Self, DeserializeError<R::Error>> {
        let value = expect_scalar(reader, name, ScalarKind::String)?;
        if let ScalarValue::Str(s) = &value {
            let mut chars = s.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return Ok(c);
            }
        }
        Err(invalid_scalar(reader.context(), "char", &value))
    }
}
