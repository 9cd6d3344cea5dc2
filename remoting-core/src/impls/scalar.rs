//! Codecs for primitive numbers and `bool`.
//!
//! Every integer travels widened to 64 bits. Readers of markup formats hand
//! back text, so each codec also accepts a string that parses to its type.

use crate::expect::{expect_scalar, invalid_scalar};
use crate::{
    Codec, DeserializeError, ScalarKind, ScalarValue, SerializeError, WireKind, WireReader,
    WireWriter,
};

macro_rules! impl_integer {
    ($kind:ident, $variant:ident, $wide:ty => $($ty:ty),+) => {
        $(
            impl Codec for $ty {
                const KIND: WireKind = WireKind::Scalar(ScalarKind::$kind);

                fn serialize<W: WireWriter + ?Sized>(
                    &self,
                    name: &str,
                    writer: &mut W,
                ) -> Result<(), SerializeError<W::Error>> {
                    writer.scalar(name, ScalarValue::$variant(*self as $wide))?;
                    Ok(())
                }

                fn deserialize<'de, R: WireReader<'de> + ?Sized>(
                    name: &str,
                    reader: &mut R,
                ) -> Result<Self, DeserializeError<R::Error>> {
                    let value = expect_scalar(reader, name, ScalarKind::$kind)?;
                    let converted = match &value {
                        ScalarValue::I64(n) => <$ty>::try_from(*n).ok(),
                        ScalarValue::U64(n) => <$ty>::try_from(*n).ok(),
                        ScalarValue::Str(s) => s.trim().parse::<$ty>().ok(),
                        ScalarValue::Bool(_) | ScalarValue::F64(_) => None,
                    };
                    converted.ok_or_else(|| invalid_scalar(reader.context(), stringify!($ty), &value))
                }
            }
        )+
    };
}

impl_integer!(UInt, U64, u64 => u8, u16, u32, u64, usize);
impl_integer!(Int, I64, i64 => i8, i16, i32, i64, isize);

macro_rules! impl_float {
    ($($ty:ty),+) => {
        $(
            impl Codec for $ty {
                const KIND: WireKind = WireKind::Scalar(ScalarKind::Float);

                fn serialize<W: WireWriter + ?Sized>(
                    &self,
                    name: &str,
                    writer: &mut W,
                ) -> Result<(), SerializeError<W::Error>> {
                    writer.scalar(name, ScalarValue::F64(f64::from(*self)))?;
                    Ok(())
                }

                fn deserialize<'de, R: WireReader<'de> + ?Sized>(
                    name: &str,
                    reader: &mut R,
                ) -> Result<Self, DeserializeError<R::Error>> {
                    let value = expect_scalar(reader, name, ScalarKind::Float)?;
                    // conversions must be exact; text may only overflow to an
                    // infinity it spells out
                    let converted = match &value {
                        ScalarValue::F64(n) => {
                            let narrowed = *n as $ty;
                            (f64::from(narrowed) == *n || n.is_nan()).then_some(narrowed)
                        }
                        ScalarValue::I64(n) => {
                            let converted = *n as $ty;
                            (converted as i128 == i128::from(*n)).then_some(converted)
                        }
                        ScalarValue::U64(n) => {
                            let converted = *n as $ty;
                            (converted as i128 == i128::from(*n)).then_some(converted)
                        }
                        ScalarValue::Str(s) => s
                            .trim()
                            .parse::<$ty>()
                            .ok()
                            .filter(|v| v.is_finite() || spells_infinity(s)),
                        ScalarValue::Bool(_) => None,
                    };
                    converted.ok_or_else(|| invalid_scalar(reader.context(), stringify!($ty), &value))
                }
            }
        )+
    };
}

fn spells_infinity(text: &str) -> bool {
    let unsigned = text.trim().trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

impl_float!(f32, f64);

impl Codec for bool {
    const KIND: WireKind = WireKind::Scalar(ScalarKind::Bool);

    fn serialize<W: WireWriter + ?Sized>(
        &self,
        name: &str,
        writer: &mut W,
    ) -> Result<(), SerializeError<W::Error>> {
        writer.scalar(name, ScalarValue::Bool(*self))?;
        Ok(())
    }

    fn deserialize<'de, R: WireReader<'de> + ?Sized>(
        name: &str,
        reader: &mut R,
    ) -> Result<Self, DeserializeError<R::Error>> {
        let value = expect_scalar(reader, name, ScalarKind::Bool)?;
        match &value {
            ScalarValue::Bool(b) => Ok(*b),
            ScalarValue::Str(s) if s.trim() == "true" => Ok(true),
            ScalarValue::Str(s) if s.trim() == "false" => Ok(false),
            _ => Err(invalid_scalar(reader.context(), "bool", &value)),
        }
    }
}
