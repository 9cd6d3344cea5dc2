use crate::tracing_macros::{debug, debug_span};
use crate::{DeserializeError, PathStep, SerializeError, WireKind, WireReader, WireWriter};

/// Serialize/deserialize pair for exactly one type.
///
/// Dispatch is static: a composite's codec calls the codec of each field's
/// type by name, and generic codecs (`Vec<T>`, `Option<T>`, `Box<T>`) call
/// `T`'s codec. That is the whole registry; there is no runtime lookup.
///
/// `name` is the name the value travels under: the field name inside a
/// composite, the empty string for a sequence element, and whatever the
/// caller chooses for the root value.
pub trait Codec: Sized {
    /// Static wire shape, used as a hint by markup readers.
    const KIND: WireKind;

    /// Write `self` under `name`.
    fn serialize<W: WireWriter + ?Sized>(
        &self,
        name: &str,
        writer: &mut W,
    ) -> Result<(), SerializeError<W::Error>>;

    /// Read a value written under `name`.
    fn deserialize<'de, R: WireReader<'de> + ?Sized>(
        name: &str,
        reader: &mut R,
    ) -> Result<Self, DeserializeError<R::Error>>;
}

/// A codec for a struct-like type with a fixed, ordered set of named fields.
pub trait Composite: Codec {
    /// Declared fields in wire order.
    const FIELDS: &'static [Field];
}

/// One entry of a composite's field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    /// Name on the wire.
    pub name: &'static str,
    /// Namespace the field is qualified with; `None` inherits the enclosing one.
    pub namespace: Option<&'static str>,
}

impl Field {
    /// An unqualified field.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            namespace: None,
        }
    }

    /// A field qualified with namespace `uri`.
    pub const fn namespaced(name: &'static str, uri: &'static str) -> Self {
        Self {
            name,
            namespace: Some(uri),
        }
    }
}

/// Serialize `value` as the root of a message, under `name`.
///
/// # Panics
///
/// Panics if a codec left the namespace stack unbalanced.
pub fn serialize<T, W>(name: &str, value: &T, writer: &mut W) -> Result<(), SerializeError<W::Error>>
where
    T: Codec,
    W: WireWriter + ?Sized,
{
    debug_span!("serialize", name);
    debug!(ty = core::any::type_name::<T>(), "serializing root value");

    let ctx = writer.context();
    ctx.reset();
    ctx.path_mut().push(PathStep::Root(name.into()));
    let result = value.serialize(name, writer);
    let ctx = writer.context();
    ctx.path_mut().pop();
    ctx.assert_balanced();

    if let Err(err) = &result {
        debug!(%err, "serialization failed");
    }
    result
}

/// Deserialize the root of a message, written under `name`.
///
/// # Panics
///
/// Panics if a codec left the namespace stack unbalanced.
pub fn deserialize<'de, T, R>(name: &str, reader: &mut R) -> Result<T, DeserializeError<R::Error>>
where
    T: Codec,
    R: WireReader<'de> + ?Sized,
{
    debug_span!("deserialize", name);
    debug!(ty = core::any::type_name::<T>(), "deserializing root value");

    let ctx = reader.context();
    ctx.reset();
    ctx.path_mut().push(PathStep::Root(name.into()));
    let result = T::deserialize(name, reader);
    let ctx = reader.context();
    ctx.path_mut().pop();
    ctx.assert_balanced();

    if let Err(err) = &result {
        debug!(%err, "deserialization failed");
    }
    result
}
