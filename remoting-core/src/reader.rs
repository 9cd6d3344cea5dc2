use core::fmt;

use crate::{WireContext, WireEvent, WireKind};

/// A source of structural and primitive wire events.
///
/// `hint` is the static [`WireKind`] of the type the calling codec is about to
/// read. Self-describing formats ignore it; markup formats need it to tell an
/// empty string from an empty composite, or to read an element as a reference
/// marker first and as the referenced value second.
///
/// `Ok(None)` means the input is exhausted.
pub trait WireReader<'de> {
    /// Error type for the concrete format.
    type Error: fmt::Debug + fmt::Display;

    /// Per-call state.
    fn context(&mut self) -> &mut WireContext;

    /// Read the next event.
    fn next_event(&mut self, hint: WireKind) -> Result<Option<WireEvent<'de>>, Self::Error>;

    /// Look at the next event without consuming it.
    ///
    /// A peek followed by a [`next_event`](WireReader::next_event) with the
    /// same hint returns the same event.
    fn peek_event(&mut self, hint: WireKind) -> Result<Option<WireEvent<'de>>, Self::Error>;

    /// Make `uri` the active namespace for the next field.
    ///
    /// Formats that carry namespaces in-band check them here or when the
    /// field's first event is read.
    fn push_namespace(&mut self, uri: &str) -> Result<(), Self::Error> {
        self.context().namespaces_mut().push(uri);
        Ok(())
    }

    /// Restore the namespace that was active before the matching push.
    fn pop_namespace(&mut self) {
        self.context().namespaces_mut().pop();
    }
}

impl<'de, R: WireReader<'de> + ?Sized> WireReader<'de> for &mut R {
    type Error = R::Error;

    fn context(&mut self) -> &mut WireContext {
        (**self).context()
    }

    fn next_event(&mut self, hint: WireKind) -> Result<Option<WireEvent<'de>>, Self::Error> {
        (**self).next_event(hint)
    }

    fn peek_event(&mut self, hint: WireKind) -> Result<Option<WireEvent<'de>>, Self::Error> {
        (**self).peek_event(hint)
    }

    fn push_namespace(&mut self, uri: &str) -> Result<(), Self::Error> {
        (**self).push_namespace(uri)
    }

    fn pop_namespace(&mut self) {
        (**self).pop_namespace()
    }
}
