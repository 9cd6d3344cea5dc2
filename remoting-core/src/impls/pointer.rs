//! Owning pointers are transparent: they travel exactly like their pointee.

use std::rc::Rc;
use std::sync::Arc;

use crate::{Codec, DeserializeError, SerializeError, WireKind, WireReader, WireWriter};

macro_rules! impl_pointer {
    ($($ptr:ident),+) => {
        $(
            impl<T: Codec> Codec for $ptr<T> {
                const KIND: WireKind = T::KIND;

                fn serialize<W: WireWriter + ?Sized>(
                    &self,
                    name: &str,
                    writer: &mut W,
                ) -> Result<(), SerializeError<W::Error>> {
                    (**self).serialize(name, writer)
                }

                fn deserialize<'de, R: WireReader<'de> + ?Sized>(
                    name: &str,
                    reader: &mut R,
                ) -> Result<Self, DeserializeError<R::Error>> {
                    T::deserialize(name, reader).map($ptr::new)
                }
            }
        )+
    };
}

impl_pointer!(Box, Rc, Arc);
