use core::fmt;

use crate::{ScalarValue, WireContext};

/// A sink for structural and primitive wire events.
///
/// Codecs are written once against this trait. A writer only has to get the
/// markers onto the wire; field order, naming and namespace scoping are driven
/// by the codecs. Writers own a [`WireContext`] so codecs can reach the active
/// namespace, the current path and the depth counter.
pub trait WireWriter {
    /// Error type for the concrete format.
    type Error: fmt::Debug + fmt::Display;

    /// Per-call state.
    fn context(&mut self) -> &mut WireContext;

    /// Begin a composite written under `name`.
    fn begin_struct(&mut self, name: &str) -> Result<(), Self::Error>;

    /// End the composite begun under `name`.
    fn end_struct(&mut self, name: &str) -> Result<(), Self::Error>;

    /// Begin a sequence of `len` elements written under `name`.
    fn begin_sequence(&mut self, name: &str, len: usize) -> Result<(), Self::Error>;

    /// End the sequence begun under `name`.
    fn end_sequence(&mut self, name: &str) -> Result<(), Self::Error>;

    /// Write a primitive value.
    fn scalar(&mut self, name: &str, value: ScalarValue<'_>) -> Result<(), Self::Error>;

    /// Write the marker of an empty reference.
    fn absent(&mut self, name: &str) -> Result<(), Self::Error>;

    /// Write the marker of a non-empty reference. The held value follows under
    /// the same name.
    ///
    /// Formats where presence is implied by the value itself can keep the
    /// default, which writes nothing.
    fn present(&mut self, name: &str) -> Result<(), Self::Error> {
        let _ = name;
        Ok(())
    }

    /// Make `uri` the active namespace for the next field.
    ///
    /// Formats that carry namespaces in-band emit them here; the default only
    /// updates the context.
    fn push_namespace(&mut self, uri: &str) -> Result<(), Self::Error> {
        self.context().namespaces_mut().push(uri);
        Ok(())
    }

    /// Restore the namespace that was active before the matching push.
    ///
    /// Infallible: this runs from a drop guard, on error paths too.
    fn pop_namespace(&mut self) {
        self.context().namespaces_mut().pop();
    }
}

impl<W: WireWriter + ?Sized> WireWriter for &mut W {
    type Error = W::Error;

    fn context(&mut self) -> &mut WireContext {
        (**self).context()
    }

    fn begin_struct(&mut self, name: &str) -> Result<(), Self::Error> {
        (**self).begin_struct(name)
    }

    fn end_struct(&mut self, name: &str) -> Result<(), Self::Error> {
        (**self).end_struct(name)
    }

    fn begin_sequence(&mut self, name: &str, len: usize) -> Result<(), Self::Error> {
        (**self).begin_sequence(name, len)
    }

    fn end_sequence(&mut self, name: &str) -> Result<(), Self::Error> {
        (**self).end_sequence(name)
    }

    fn scalar(&mut self, name: &str, value: ScalarValue<'_>) -> Result<(), Self::Error> {
        (**self).scalar(name, value)
    }

    fn absent(&mut self, name: &str) -> Result<(), Self::Error> {
        (**self).absent(name)
    }

    fn present(&mut self, name: &str) -> Result<(), Self::Error> {
        (**self).present(name)
    }

    fn push_namespace(&mut self, uri: &str) -> Result<(), Self::Error> {
        (**self).push_namespace(uri)
    }

    fn pop_namespace(&mut self) {
        (**self).pop_namespace()
    }
}
